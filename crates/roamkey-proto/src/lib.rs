//! Roamkey Wire Codec
//!
//! Information elements and action frames for the fast BSS transition
//! handshake: the mobility domain element, the fast transition element with
//! its sub-elements, the RSN element fields the handshake inspects, and the
//! over-the-DS action frame envelope.
//!
//! # Invariants
//!
//! - Parsing is allocation-bounded and panic-free on arbitrary input; every
//!   slice is length-checked before it is taken
//! - Parsed frames keep the raw bytes of each security element, because the
//!   handshake MIC covers the bytes exactly as transmitted
//! - Serialization computes each element's declared length up front and
//!   fails on disagreement rather than emitting a corrupt element

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod errors;
mod ftie;
mod gtk;
mod mdie;
mod rsne;
mod status;
mod subelem;
mod types;

pub use action::{CATEGORY_FT, EID_RIC_DATA, FtAction, FtActionFrame, FtElements};
pub use errors::{ProtocolError, Result};
pub use ftie::{EID_FTIE, FtIe, SUB_GTK, SUB_R0KH_ID, SUB_R1KH_ID, mic_zeroed};
pub use gtk::{GtkSubElement, pad_group_key};
pub use mdie::{CAP_FT_OVER_DS, CAP_RESOURCE_REQUEST, EID_MDIE, MdIe};
pub use rsne::{
    AKM_FT_8021X, AKM_FT_PSK, CIPHER_CCMP, CIPHER_TKIP, EID_RSN, Rsne, SuiteSelector,
};
pub use status::StatusCode;
pub use subelem::{SubElements, write_sub_element};
pub use types::{MacAddr, MobilityDomainId};
