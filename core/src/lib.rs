//! FX-series PLC wire protocol: frame codec, register address map, and the
//! single-flight client built on top of them.
//!
//! This crate has no concept of a request queue or a worker thread — that
//! orchestration is [`fxplc-broker`]'s job. It only knows how to turn a
//! [`RegisterRef`] into an address, build and parse one frame, and run one
//! operation to completion against a [`fxplc_transport::Transport`].

mod address;
mod client;
mod error;
mod frame;
#[cfg(feature = "mock")]
mod mock;
mod number;
mod register;

pub use client::{Client, PlcClient};
pub use error::{ClientError, Result};
#[cfg(feature = "mock")]
pub use mock::MockClient;
pub use number::{Number, NumberEncoding};
pub use register::{RegisterClass, RegisterRef};

pub mod addressing {
    //! Pure address-map functions, exposed for callers (and tests) that
    //! need to compute a device address without going through a [`Client`].
    pub use crate::address::{bit_image, force_bit, word_data};
}

pub mod wire {
    //! Pure frame encode/decode, exposed for property and conformance
    //! tests that check bytes on the wire without a transport.
    pub use crate::frame::{
        byte_read_payload, byte_write_payload, encode_frame, force_payload, parse_response,
        ByteReader, Command,
    };
}
