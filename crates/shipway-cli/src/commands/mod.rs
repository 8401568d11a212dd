pub mod deploy;
pub mod init;
pub mod scale_sim;
pub mod synth;
pub mod validate;
