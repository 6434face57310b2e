#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Line-prefix grammars for spotting top-level Python declarations.
//!
//! These rules look at one physical line at a time and only match statements
//! that start in column zero. They are not a Python parser: imports inside
//! functions, declarations split across lines, or `import a, b` lists are
//! under-counted on purpose.

peg::parser! {
    /// grammars matching unindented `import`, `from`, `def`, and `class` lines.
    pub grammar line() for str {
        /// matches one or more spaces or tabs
        rule whitespace() = quiet!{[' ' | '\t']+}

        /// matches a Python identifier-ish word (letters, digits, underscore)
        rule word() -> &'input str
            = $([c if c.is_alphanumeric() || c == '_']+)

        /// matches whatever is left on the line
        rule rest() = [_]*

        /// `import X...`, returns `X`
        rule plain_import() -> &'input str
            = "import" whitespace() n:word() rest() { n }

        /// `from X... import ...`, returns `X`
        rule from_import() -> &'input str
            = "from" whitespace() n:word() (!"import" [_])* "import" rest() { n }

        /// parses the root module name imported on this line
        pub rule import_root() -> &'input str
            = plain_import() / from_import()

        /// parses the name of a top-level function definition
        pub rule function_name() -> &'input str
            = "def" whitespace() n:word() rest() { n }

        /// parses the name of a top-level class definition
        pub rule class_name() -> &'input str
            = "class" whitespace() n:word() rest() { n }
    }
}
