pub mod log;
pub mod pmio;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    User = 3,
    Kernel = 0,
}
