//! Registration and resume document builders

use mongodb::bson::{doc, oid::ObjectId, Document};

/// Fixed ObjectId with `n` as its last byte
pub fn oid(n: u8) -> ObjectId {
    ObjectId::parse_str(format!("5c4a1f00000000000000{:04x}", n)).expect("Valid ObjectId hex")
}

/// Registration document as written by the sign-up flow
pub fn user_doc(id: ObjectId, name: &str, school: &str, grad_year: &str) -> Document {
    let handle = name.to_lowercase();
    doc! {
        "_id": id,
        "email": format!("{}@example.edu", handle),
        "profile": {
            "name": name,
            "school": school,
            "graduationYear": grad_year,
        },
        "confirmation": {
            "github": format!("{}-gh", handle),
            "twitter": format!("{}-social", handle),
            "major": "Computer Science",
        },
    }
}

/// Resume document linking `owner` to `url`
pub fn resume_doc(owner: &ObjectId, url: &str) -> Document {
    doc! {
        "_id": ObjectId::new(),
        "userid": owner.to_hex(),
        "url": url,
    }
}
