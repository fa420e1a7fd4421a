use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a customer sits in the collection lifecycle.
///
/// The set of statuses is owned by the backend and open-ended; anything the
/// client does not recognize is carried through `Other` and rendered
/// verbatim. The client never invents a transition of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Pending,
    Successful,
    Other(String),
}

impl CallStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Pending => "Pending",
            CallStatus::Successful => "SUCCESSFUL",
            CallStatus::Other(s) => s,
        }
    }

    /// Eligible for a call and for the pending view.
    pub fn is_pending(&self) -> bool {
        matches!(self, CallStatus::Pending)
    }

    /// Eligible for the resolved view.
    pub fn is_successful(&self) -> bool {
        matches!(self, CallStatus::Successful)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Pending" => CallStatus::Pending,
            "SUCCESSFUL" => CallStatus::Successful,
            _ => CallStatus::Other(raw),
        })
    }
}

/// A loan customer record as the backend reports it.
///
/// `id` is opaque and immutable; the backend serializes it as either a number
/// or a string depending on the store, so it is normalized to a string here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub loan_amount: f64,
    pub due_date: NaiveDate,
    pub call_status: CallStatus,
    /// Populated only after a call outcome has been recorded.
    #[serde(default)]
    pub notes: Option<String>,
}

fn id_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid customer id: {other}"))),
    }
}

/// Create-customer payload. New records always start out pending.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub loan_amount: f64,
    pub due_date: NaiveDate,
    pub call_status: CallStatus,
}

impl NewCustomer {
    pub fn pending(name: String, phone: String, loan_amount: f64, due_date: NaiveDate) -> Self {
        Self {
            name,
            phone,
            loan_amount,
            due_date,
            call_status: CallStatus::Pending,
        }
    }
}

/// List responses are shaped `{ "customers": [...] }`; a missing key means an
/// empty list, not an error.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerList {
    #[serde(default)]
    pub customers: Vec<Customer>,
}

/// Upload acknowledgment; the server may attach a display message.
#[derive(Debug, Default, Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_customers_key_is_empty_list() {
        let list: CustomerList = serde_json::from_str("{}").unwrap();
        assert!(list.customers.is_empty());
    }

    #[test]
    fn test_customer_decodes_with_numeric_id_and_unknown_status() {
        let raw = r#"{
            "id": 7,
            "name": "John Doe",
            "phone": "555-0100",
            "loan_amount": 5000.0,
            "due_date": "2025-01-01",
            "call_status": "NEEDFOLLOWUP"
        }"#;
        let customer: Customer = serde_json::from_str(raw).unwrap();
        assert_eq!(customer.id, "7");
        assert_eq!(customer.call_status, CallStatus::Other("NEEDFOLLOWUP".into()));
        assert_eq!(customer.call_status.to_string(), "NEEDFOLLOWUP");
        assert_eq!(customer.notes, None);
    }

    #[test]
    fn test_status_wire_literals() {
        let pending: CallStatus = serde_json::from_str(r#""Pending""#).unwrap();
        let successful: CallStatus = serde_json::from_str(r#""SUCCESSFUL""#).unwrap();
        assert!(pending.is_pending());
        assert!(successful.is_successful());
        assert_eq!(serde_json::to_string(&pending).unwrap(), r#""Pending""#);
        assert_eq!(serde_json::to_string(&successful).unwrap(), r#""SUCCESSFUL""#);
    }

    #[test]
    fn test_new_customer_serializes_snake_case_pending() {
        let customer = NewCustomer::pending(
            "A".into(),
            "1".into(),
            1000.0,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["call_status"], "Pending");
        assert_eq!(value["due_date"], "2025-01-01");
        assert_eq!(value["loan_amount"], 1000.0);
    }
}
