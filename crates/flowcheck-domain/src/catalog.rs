//! Well-known services available to every policy set.

use crate::model::{ServiceBook, ServiceEntry, ServiceObject};

pub fn default_services() -> Vec<ServiceObject> {
    vec![
        ServiceObject::new("DNS", vec![ServiceEntry::udp(53, 53)]),
        ServiceObject::new("HTTP", vec![ServiceEntry::tcp(80, 80)]),
        ServiceObject::new("HTTPS", vec![ServiceEntry::tcp(443, 443)]),
        ServiceObject::new("SSH", vec![ServiceEntry::tcp(22, 22)]),
        ServiceObject::new("SMTP", vec![ServiceEntry::tcp(25, 25)]),
    ]
}

impl ServiceBook {
    /// A book seeded with [`default_services`]. Later inserts of the same name replace them.
    pub fn with_defaults() -> Self {
        let mut book = ServiceBook::default();
        for service in default_services() {
            book.insert_service(service);
        }
        book
    }
}
