/// The text streams produced by one generation run.
///
/// Streams are plain `String`s owned by the run; the caller decides where they end up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSinks {
    /// Class declarations, preceded by the macro prelude.
    pub declarations: String,
    /// Constructor definitions in dependency-before-dependent order.
    pub definitions: String,
    /// Body of the integral assembly dispatcher.
    pub assembly: String,
    /// Body of the gradient assembler.
    pub gradient: String,
    /// Store-layout legend and debug print index, present only for debug builds.
    pub debug: Option<String>,
}

impl OutputSinks {
    pub fn new(debug: bool) -> Self {
        Self {
            debug: debug.then(String::new),
            ..Self::default()
        }
    }

    /// Appends one finished generation unit.
    pub fn flush_unit(&mut self, unit: UnitBuffer) {
        self.declarations.push_str(&unit.declarations);
        self.definitions.push_str(&unit.definitions);
    }
}

/// Declaration and definition text of a single shell pair, buffered until the unit is complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitBuffer {
    pub declarations: String,
    pub definitions: String,
}

impl UnitBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}
