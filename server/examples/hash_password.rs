//! Generate an Argon2id password hash for manually seeding users.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("Usage: hash_password <password>");
        std::process::exit(1);
    };

    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => println!("{hash}"),
        Err(e) => {
            eprintln!("Failed to hash password: {e}");
            std::process::exit(1);
        }
    }
}
