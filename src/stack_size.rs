// Search recursion and the per-ply move lists live on the stack.
pub const STACK_SIZE: usize = 128 * 1024 * 1024;
