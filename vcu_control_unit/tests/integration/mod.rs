mod bench;
mod faults;
mod hard_brake;
mod handshake;
mod indicators;
mod liveness;
mod ready_to_drive;
