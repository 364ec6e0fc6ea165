pub mod common;
pub mod curve;
pub mod domain;
pub mod mdat;
pub mod numerics;
pub mod projection;
pub mod record;
pub mod sensx;
