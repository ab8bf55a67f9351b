use uuid::Uuid;

use crate::{Error, RoleSet, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub roles: RoleSet,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub initial_password_hash: String,
    pub roles: RoleSet,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.name)?;
        crate::validate_string(&self.initial_password_hash)?;
        if self.name.is_empty() || self.name.chars().any(|c| c.is_control()) {
            return Err(Error::InvalidName(self.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            id: UserId::stub(),
            name: String::from(name),
            initial_password_hash: String::from("hash"),
            roles: RoleSet::plain_user(),
        }
    }

    #[test]
    fn validates_names() {
        assert_eq!(new_user("alice").validate(), Ok(()));
        assert_eq!(
            new_user("").validate(),
            Err(Error::InvalidName(String::new()))
        );
        assert_eq!(
            new_user("a\nb").validate(),
            Err(Error::InvalidName(String::from("a\nb")))
        );
        assert_eq!(
            new_user("a\0b").validate(),
            Err(Error::NullByteInString(String::from("a\0b")))
        );
    }
}
