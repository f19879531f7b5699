//! Request and response types for the call resource endpoints

pub mod phone_call;

pub use phone_call::{
    CallListResponse, CreateCallRequest, PageParams, PhoneCallResponse,
};
