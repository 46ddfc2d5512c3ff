//! This module defines the cosmetic options of code emission.
//!
//! It provides the `EmitOptions` struct, which names the function qualifier and scalar type
//! written into the generated kernels. Neither affects which classes are generated or the
//! numeric content of any recurrence; they only adapt the text to the target toolchain.

/// Spelling choices for the emitted kernel source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Qualifier placed before every generated constructor.
    ///
    /// An empty string emits plain host functions.
    pub qualifier: String,
    /// Name of the floating-point type of every integral value and geometric factor.
    pub scalar: String,
}

impl EmitOptions {
    /// The qualifier followed by a separating space, or nothing when no qualifier is set.
    pub fn qualifier_prefix(&self) -> String {
        let qualifier = self.qualifier.trim();
        if qualifier.is_empty() {
            String::new()
        } else {
            format!("{} ", qualifier)
        }
    }
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            qualifier: "__device__ __inline__".to_string(),
            scalar: "QUICKDouble".to_string(),
        }
    }
}
