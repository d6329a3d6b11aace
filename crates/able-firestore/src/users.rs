//! Repository for user accounts and the email-uniqueness index.
//!
//! Every user create pairs the `users/{id}` document with a
//! `user_emails/{lowercase email}` index document in one atomic batch
//! write. The index create carries an exists=false precondition, so two
//! concurrent registrations with the same email cannot both commit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;

use able_models::{Role, User};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    from_document, to_fields, StructuredQuery, ToFirestoreValue, Value, Write,
};

pub const USERS: &str = "users";
pub const USER_EMAILS: &str = "user_emails";

/// Index key: emails are compared case-insensitively.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Persistence form of a user. The serde skips that keep secrets out of
    /// API responses must not keep them out of the database.
    fn stored_fields(user: &User) -> FirestoreResult<HashMap<String, Value>> {
        let mut fields = to_fields(user)?;
        fields.insert(
            "password_hash".to_string(),
            user.password_hash.to_firestore_value(),
        );
        fields.insert(
            "reset_token".to_string(),
            user.reset_token.to_firestore_value(),
        );
        fields.insert(
            "reset_token_expires".to_string(),
            user.reset_token_expires.to_firestore_value(),
        );
        Ok(fields)
    }

    /// Create a user atomically with its email-index document.
    ///
    /// Fails with AlreadyExists when the email is taken, regardless of which
    /// concurrent writer got there first.
    pub async fn create(&self, user: &User) -> FirestoreResult<()> {
        let index_fields: HashMap<String, Value> = [
            ("user_id".to_string(), user.id.to_firestore_value()),
            ("email".to_string(), user.email.to_firestore_value()),
        ]
        .into();

        let writes = vec![
            Write::create(
                self.client
                    .full_document_name(USER_EMAILS, &email_key(&user.email)),
                index_fields,
            ),
            Write::create(
                self.client.full_document_name(USERS, &user.id),
                Self::stored_fields(user)?,
            ),
        ];

        self.client.batch_write(writes).await.map_err(|e| {
            if matches!(e, FirestoreError::AlreadyExists(_)) || e.is_precondition_failed() {
                FirestoreError::AlreadyExists(email_key(&user.email))
            } else {
                e
            }
        })?;

        info!(user_id = %user.id, role = %user.role, "created user");
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> FirestoreResult<Option<User>> {
        match self.client.get_document(USERS, user_id).await? {
            Some(doc) => Ok(Some(from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Look up a user through the email index.
    pub async fn find_by_email(&self, email: &str) -> FirestoreResult<Option<User>> {
        let index = self
            .client
            .get_document(USER_EMAILS, &email_key(email))
            .await?;

        let Some(index) = index else { return Ok(None) };
        let user_id = index
            .fields
            .as_ref()
            .and_then(|f| f.get("user_id"))
            .and_then(|v| match v {
                Value::StringValue(s) => Some(s.clone()),
                _ => None,
            })
            .ok_or_else(|| {
                FirestoreError::InvalidResponse(format!(
                    "email index {} missing user_id",
                    email_key(email)
                ))
            })?;

        self.get(&user_id).await
    }

    pub async fn find_by_username(&self, username: &str) -> FirestoreResult<Option<User>> {
        let docs = self
            .client
            .run_query(
                StructuredQuery::collection(USERS)
                    .where_eq("username", Value::StringValue(username.to_string()))
                    .with_limit(1),
            )
            .await?;

        match docs.first() {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Resolve a login identifier: email when it contains '@', otherwise
    /// username.
    pub async fn find_by_identifier(&self, identifier: &str) -> FirestoreResult<Option<User>> {
        if identifier.contains('@') {
            self.find_by_email(identifier).await
        } else {
            self.find_by_username(identifier).await
        }
    }

    /// Full-document replace. The email index is not touched; email is
    /// immutable after registration.
    pub async fn update(&self, user: &User) -> FirestoreResult<()> {
        self.client
            .update_document(USERS, &user.id, Self::stored_fields(user)?, None)
            .await?;
        Ok(())
    }

    /// Store a password-reset token and its expiry.
    pub async fn set_reset_token(
        &self,
        user_id: &str,
        token: &str,
        expires: DateTime<Utc>,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("reset_token".to_string(), token.to_firestore_value());
        fields.insert(
            "reset_token_expires".to_string(),
            expires.to_firestore_value(),
        );

        self.client
            .update_document(
                USERS,
                user_id,
                fields,
                Some(vec![
                    "reset_token".to_string(),
                    "reset_token_expires".to_string(),
                ]),
            )
            .await?;
        Ok(())
    }

    /// Set a new password hash and clear the reset token in one masked
    /// update, so the token cannot be replayed.
    pub async fn consume_reset_token(
        &self,
        user_id: &str,
        new_password_hash: &str,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "password_hash".to_string(),
            new_password_hash.to_firestore_value(),
        );
        fields.insert("reset_token".to_string(), Value::NullValue(()));
        fields.insert("reset_token_expires".to_string(), Value::NullValue(()));

        self.client
            .update_document(
                USERS,
                user_id,
                fields,
                Some(vec![
                    "password_hash".to_string(),
                    "reset_token".to_string(),
                    "reset_token_expires".to_string(),
                ]),
            )
            .await?;
        Ok(())
    }

    pub async fn set_approved(&self, user_id: &str, approved: bool) -> FirestoreResult<()> {
        self.set_flag(user_id, "approved", approved).await
    }

    pub async fn set_suspended(&self, user_id: &str, suspended: bool) -> FirestoreResult<()> {
        self.set_flag(user_id, "suspended", suspended).await
    }

    async fn set_flag(&self, user_id: &str, field: &str, value: bool) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(field.to_string(), value.to_firestore_value());

        self.client
            .update_document(USERS, user_id, fields, Some(vec![field.to_string()]))
            .await?;
        Ok(())
    }

    /// Replace the saved-jobs list.
    pub async fn set_saved_jobs(&self, user_id: &str, saved_jobs: &[String]) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "saved_jobs".to_string(),
            saved_jobs.to_vec().to_firestore_value(),
        );

        self.client
            .update_document(USERS, user_id, fields, Some(vec!["saved_jobs".to_string()]))
            .await?;
        Ok(())
    }

    /// Append to applied_jobs after a successful application submit.
    pub async fn add_applied_job(&self, user_id: &str, job_id: &str) -> FirestoreResult<()> {
        let Some(user) = self.get(user_id).await? else {
            return Err(FirestoreError::not_found(format!("users/{}", user_id)));
        };

        let mut applied = user.applied_jobs;
        if !applied.iter().any(|j| j == job_id) {
            applied.push(job_id.to_string());
        }

        let mut fields = HashMap::new();
        fields.insert("applied_jobs".to_string(), applied.to_firestore_value());

        self.client
            .update_document(
                USERS,
                user_id,
                fields,
                Some(vec!["applied_jobs".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Delete a user and its email-index document atomically.
    pub async fn delete(&self, user: &User) -> FirestoreResult<()> {
        let writes = vec![
            Write::delete(self.client.full_document_name(USERS, &user.id)),
            Write::delete(
                self.client
                    .full_document_name(USER_EMAILS, &email_key(&user.email)),
            ),
        ];
        self.client.batch_write(writes).await?;
        info!(user_id = %user.id, "deleted user");
        Ok(())
    }

    /// All users, optionally filtered by role.
    pub async fn list(&self, role: Option<Role>) -> FirestoreResult<Vec<User>> {
        let docs = match role {
            Some(role) => {
                self.client
                    .run_query(
                        StructuredQuery::collection(USERS)
                            .where_eq("role", Value::StringValue(role.as_str().to_string())),
                    )
                    .await?
            }
            None => self.client.list_all_documents(USERS).await?,
        };

        let mut users = Vec::with_capacity(docs.len());
        for doc in &docs {
            users.push(from_document(doc)?);
        }
        Ok(users)
    }

    pub async fn count(&self) -> FirestoreResult<usize> {
        Ok(self.client.list_all_documents(USERS).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_key_normalizes_case_and_whitespace() {
        assert_eq!(email_key(" Sam@Example.COM "), "sam@example.com");
    }

    #[test]
    fn stored_fields_keep_the_password_hash() {
        let user = User::new("u1", "sam", "sam@test", "bcrypt-hash", Role::Jobseeker);
        let fields = UserRepository::stored_fields(&user).unwrap();
        assert!(matches!(
            fields.get("password_hash"),
            Some(Value::StringValue(s)) if s == "bcrypt-hash"
        ));
        // cleared token fields persist as explicit nulls
        assert!(matches!(
            fields.get("reset_token"),
            Some(Value::NullValue(()))
        ));
    }

    #[test]
    fn stored_fields_round_trip_through_document() {
        let mut user = User::new("u1", "sam", "sam@test", "hash", Role::Employer);
        user.saved_jobs = vec!["j1".to_string(), "j2".to_string()];
        let doc = crate::types::Document::new(UserRepository::stored_fields(&user).unwrap());
        let back: User = from_document(&doc).unwrap();
        assert_eq!(back.id, "u1");
        assert_eq!(back.password_hash, "hash");
        assert_eq!(back.role, Role::Employer);
        assert!(!back.approved);
        assert_eq!(back.saved_jobs, vec!["j1", "j2"]);
    }
}
