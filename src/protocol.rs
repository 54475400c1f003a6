use crate::snowball;
use actix_derive::{Message, MessageResponse};

#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "Response")]
pub enum Request {
    // Snowball rounds
    QueryPreference(snowball::PreferenceQuery),
    // Clients
    Submit(snowball::Submit),
    GetStatus(snowball::GetStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize, MessageResponse)]
pub enum Response {
    PreferenceAck(snowball::PreferenceAck),
    SubmitAck(snowball::SubmitAck),
    StatusAck(snowball::StatusAck),
    // Error
    Unknown,
}
