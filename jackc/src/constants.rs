//! Constant values of the Jack language and its stack machine target.

/// Largest integer constant the language accepts. Words are 16-bit
/// two's complement, so negative values are produced with `neg`.
pub const MAX_INT: u16 = 0x7FFF; // 32767

/// Index of the `pointer` segment that holds the base of `this`.
pub const THIS_POINTER: u16 = 0;

/// Index of the `pointer` segment that holds the base of `that`.
pub const THAT_POINTER: u16 = 1;

/// `temp` slot used as scratch space by generated code.
pub const SCRATCH_TEMP: u16 = 0;

/// Name of the implicit receiver argument of methods.
pub const RECEIVER: &str = "this";

// ----------------------------------------------------------------------------
// Operating system routines called by generated code.

/// `Math.multiply(x, y)`, for `*`.
pub const MATH_MULTIPLY: &str = "Math.multiply";

/// `Math.divide(x, y)`, for `/`.
pub const MATH_DIVIDE: &str = "Math.divide";

/// `Memory.alloc(size)`, for object allocation in constructors.
pub const MEMORY_ALLOC: &str = "Memory.alloc";

/// `String.new(maxLength)`, for string constants.
pub const STRING_NEW: &str = "String.new";

/// `String.appendChar(c)`, for string constants.
pub const STRING_APPEND_CHAR: &str = "String.appendChar";
