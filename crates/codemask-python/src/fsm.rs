//! Scanner context as an explicit state machine.
//!
//! The scanner feeds one [`Event`] per significant token and asks the
//! current [`State`] how to classify the next identifier. Transitions are
//! pure, so the table below is tested on its own.

/// Where the scanner is relative to headers and decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Ordinary statements.
    #[default]
    Code,
    /// Right after a line-leading `@`.
    Decorator { property: bool },
    /// Inside a decorator's dotted name (`@app.route`, `@value.setter`).
    DecoratorName { property: bool },
    /// Inside a decorator's argument list.
    DecoratorArgs { property: bool },
    /// A property decorator line ended; the next definition is an accessor.
    PropertyPending,
    /// After `def`, expecting the definition's name.
    DefName { property: bool },
    /// Inside a definition's signature, up to the header colon.
    Signature,
    /// After `class`, expecting the class name.
    ClassName,
    /// Base list of a class header, up to the header colon.
    ClassHeader,
    /// A `case` clause's pattern, up to the clause colon.
    CasePattern,
}

/// A token class the machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `@` at the start of a logical line.
    At,
    Def,
    Class,
    /// `case` at the start of a logical line.
    Case,
    /// `property` directly after `@`.
    Property,
    /// `setter`, `getter` or `deleter` inside a decorator name.
    Accessor,
    /// Any other identifier.
    Name,
    /// `.` between identifiers.
    Dot,
    /// Any other punctuation.
    Punct,
    /// `:` outside brackets.
    HeaderEnd,
    /// End of a logical line (outside brackets).
    Newline,
}

impl State {
    /// The state after `event`.
    pub fn next(self, event: Event) -> State {
        use Event as E;
        use State as S;

        match (self, event) {
            // === Decorators ===
            (S::Code, E::At) => S::Decorator { property: false },
            (S::PropertyPending, E::At) => S::Decorator { property: true },
            (S::Decorator { .. }, E::Property) => S::DecoratorName { property: true },
            (S::Decorator { property }, E::Name | E::Accessor) => S::DecoratorName { property },
            (S::DecoratorName { .. }, E::Accessor) => S::DecoratorName { property: true },
            (S::DecoratorName { property }, E::Dot | E::Name | E::Property) => {
                S::DecoratorName { property }
            }
            (S::DecoratorName { property }, E::Punct) => S::DecoratorArgs { property },
            (
                S::Decorator { property } | S::DecoratorName { property } | S::DecoratorArgs { property },
                E::Newline,
            ) => {
                if property {
                    S::PropertyPending
                } else {
                    S::Code
                }
            }

            // === Definitions ===
            (S::Code, E::Def) => S::DefName { property: false },
            (S::PropertyPending, E::Def) => S::DefName { property: true },
            (S::DefName { .. }, E::Name | E::Property | E::Accessor) => S::Signature,
            (S::Signature, E::HeaderEnd) => S::Code,

            // === Classes ===
            (S::Code | S::PropertyPending, E::Class) => S::ClassName,
            (S::ClassName, E::Name | E::Property | E::Accessor) => S::ClassHeader,
            (S::ClassHeader, E::HeaderEnd) => S::Code,

            // === Match statements ===
            (S::Code, E::Case) => S::CasePattern,
            (S::CasePattern, E::HeaderEnd) => S::Code,

            // A property decorator waits across lines for its definition.
            (S::PropertyPending, E::Newline) => S::PropertyPending,
            // Malformed headers end with the line.
            (_, E::Newline) => S::Code,

            (state, _) => state,
        }
    }

    pub fn in_signature(self) -> bool {
        self == State::Signature
    }

    pub fn in_case_pattern(self) -> bool {
        self == State::CasePattern
    }
}
