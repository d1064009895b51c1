pub mod address;
pub mod contract;
pub mod error;
pub mod evidence;
pub mod fees;
pub mod msg;
pub mod operation;
pub mod relayer;
pub mod signatures;
pub mod state;
pub mod tickets;
pub mod token;
