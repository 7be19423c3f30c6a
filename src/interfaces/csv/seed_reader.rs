use crate::domain::course::Course;
use crate::domain::money::Amount;
use crate::domain::user::User;
use crate::error::{EnrollmentError, Result};
use serde::Deserialize;
use std::io::Read;

/// Seeds the course catalog from CSV.
///
/// Columns: `id,slug,title,price,stripe_price_id` with `price` in minor
/// units and an empty `stripe_price_id` meaning not purchasable through
/// the hosted path. Whitespace is trimmed and record length is flexible.
pub struct CourseReader<R: Read> {
    reader: csv::Reader<R>,
}

#[derive(Debug, Deserialize)]
struct CourseRecord {
    id: String,
    slug: String,
    title: String,
    price: u64,
    stripe_price_id: Option<String>,
}

impl<R: Read> CourseReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: build_reader(source),
        }
    }

    pub fn courses(self) -> impl Iterator<Item = Result<Course>> {
        self.reader.into_deserialize().map(|result| {
            let record: CourseRecord = result.map_err(EnrollmentError::from)?;
            Ok(Course {
                id: record.id,
                slug: record.slug,
                title: record.title,
                price: Amount::new(record.price)?,
                stripe_price_id: record.stripe_price_id.filter(|id| !id.is_empty()),
            })
        })
    }
}

/// Seeds the user directory from CSV.
///
/// Columns: `id,email,name,token,stripe_customer_id`; `token` is the
/// bearer session token that authenticates the user.
pub struct UserReader<R: Read> {
    reader: csv::Reader<R>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
    token: String,
    stripe_customer_id: Option<String>,
}

impl<R: Read> UserReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: build_reader(source),
        }
    }

    /// Yields `(user, token)` pairs.
    pub fn users(self) -> impl Iterator<Item = Result<(User, String)>> {
        self.reader.into_deserialize().map(|result| {
            let record: UserRecord = result.map_err(EnrollmentError::from)?;
            let user = User {
                id: record.id,
                email: record.email,
                name: record.name,
                stripe_customer_id: record.stripe_customer_id.filter(|id| !id.is_empty()),
            };
            Ok((user, record.token))
        })
    }
}

fn build_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
}
