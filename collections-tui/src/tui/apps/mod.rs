pub mod add_customer;
pub mod customer_list;
pub mod upload_recording;

pub use add_customer::AddCustomerApp;
pub use customer_list::{CustomerListApp, ListScope};
pub use upload_recording::UploadRecordingApp;

/// Addressable dashboard views, switched with Tab or the digit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    AllCustomers,
    PendingCustomers,
    ResolvedCustomers,
    AddCustomer,
    UploadRecording,
}

impl View {
    pub const ALL: [View; 5] = [
        View::AllCustomers,
        View::PendingCustomers,
        View::ResolvedCustomers,
        View::AddCustomer,
        View::UploadRecording,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::AllCustomers => "All Customers",
            View::PendingCustomers => "Pending Calls",
            View::ResolvedCustomers => "Resolved",
            View::AddCustomer => "Add Customer",
            View::UploadRecording => "Upload Recording",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn from_digit(c: char) -> Option<View> {
        let idx = c.to_digit(10)? as usize;
        Self::ALL.get(idx.checked_sub(1)?).copied()
    }
}
