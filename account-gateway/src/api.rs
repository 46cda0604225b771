// Request and response bodies for the account API
// Validation accumulates every failed check before rejecting a request

use crate::error::ApiError;
use account_core::{Account, AccountCommand, AccountId, Money, OwnerId, TransactionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/v1/accounts`
///
/// The account id is generated server side; the caller supplies the
/// owner and the idempotency key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    pub transaction_id: String,
    pub owner_id: String,
}

/// Body of `PUT /api/v1/accounts/{accountId}/deposits`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMoneyRequest {
    pub money: i64,
    pub transaction_id: String,
}

/// Body of `PUT /api/v1/accounts/{accountId}/withdraws`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawMoneyRequest {
    pub money: i64,
    pub transaction_id: String,
}

/// Body of `GET /api/v1/accounts/{accountId}` responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: Uuid,
    pub owner_id: Uuid,
    pub balance: i64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id.as_uuid(),
            owner_id: account.owner_id.as_uuid(),
            balance: account.balance.value(),
        }
    }
}

impl OpenAccountRequest {
    /// Validate the request and build the open command
    pub fn validate(self) -> Result<AccountCommand, ApiError> {
        let mut errors = Vec::new();
        let transaction_id = parse_uuid_field("Transaction id", &self.transaction_id, &mut errors);
        let owner_id = parse_uuid_field("Owner id", &self.owner_id, &mut errors);

        match (transaction_id, owner_id) {
            (Some(transaction_id), Some(owner_id)) => Ok(AccountCommand::Open {
                account_id: AccountId::new(Uuid::new_v4()),
                owner_id: OwnerId::new(owner_id),
                transaction_id: TransactionId::new(transaction_id),
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

impl DepositMoneyRequest {
    /// Validate the request against its path account id and build the command
    pub fn validate(self, account_id: &str) -> Result<AccountCommand, ApiError> {
        let (account_id, amount, transaction_id) =
            validate_mutation(account_id, self.money, &self.transaction_id)?;
        Ok(AccountCommand::Deposit {
            account_id,
            amount,
            transaction_id,
        })
    }
}

impl WithdrawMoneyRequest {
    /// Validate the request against its path account id and build the command
    pub fn validate(self, account_id: &str) -> Result<AccountCommand, ApiError> {
        let (account_id, amount, transaction_id) =
            validate_mutation(account_id, self.money, &self.transaction_id)?;
        Ok(AccountCommand::Withdraw {
            account_id,
            amount,
            transaction_id,
        })
    }
}

/// Parse the account id path segment of query and mutation routes
pub fn parse_account_id(value: &str) -> Result<AccountId, ApiError> {
    let mut errors = Vec::new();
    match parse_uuid_field("Account id", value, &mut errors) {
        Some(id) => Ok(AccountId::new(id)),
        None => Err(ApiError::Validation(errors)),
    }
}

fn validate_mutation(
    account_id: &str,
    money: i64,
    transaction_id: &str,
) -> Result<(AccountId, Money, TransactionId), ApiError> {
    let mut errors = Vec::new();
    let transaction_id = parse_uuid_field("Transaction id", transaction_id, &mut errors);
    let account_id = parse_uuid_field("Account id", account_id, &mut errors);
    let amount = match Money::new(money) {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    match (account_id, amount, transaction_id) {
        (Some(account_id), Some(amount), Some(transaction_id)) => Ok((
            AccountId::new(account_id),
            amount,
            TransactionId::new(transaction_id),
        )),
        _ => Err(ApiError::Validation(errors)),
    }
}

// A blank value fails both the emptiness and the format check, and both
// failures are reported.
fn parse_uuid_field(label: &str, value: &str, errors: &mut Vec<String>) -> Option<Uuid> {
    if value.trim().is_empty() {
        errors.push(format!("{} should not be empty", label));
    }
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(format!("{} should be in UUID format", label));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(result: Result<AccountCommand, ApiError>) -> Vec<String> {
        match result {
            Err(ApiError::Validation(errors)) => errors,
            _ => panic!("expected a validation failure"),
        }
    }

    #[test]
    fn test_open_request_builds_command_with_fresh_account_id() {
        let owner = Uuid::new_v4();
        let transaction = Uuid::new_v4();
        let request = OpenAccountRequest {
            transaction_id: transaction.to_string(),
            owner_id: owner.to_string(),
        };

        let command = request.validate().unwrap();
        match command {
            AccountCommand::Open {
                owner_id,
                transaction_id,
                ..
            } => {
                assert_eq!(owner_id.as_uuid(), owner);
                assert_eq!(transaction_id.as_uuid(), transaction);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_open_request_accumulates_all_failures() {
        let request = OpenAccountRequest {
            transaction_id: "".to_string(),
            owner_id: "not-a-uuid".to_string(),
        };

        let errors = errors_of(request.validate());
        // Blank transaction id fails both checks, bad owner id fails one
        assert_eq!(
            errors,
            vec![
                "Transaction id should not be empty".to_string(),
                "Transaction id should be in UUID format".to_string(),
                "Owner id should be in UUID format".to_string(),
            ]
        );
    }

    #[test]
    fn test_deposit_request_validates_every_field() {
        let request = DepositMoneyRequest {
            money: -10,
            transaction_id: "nope".to_string(),
        };

        let errors = errors_of(request.validate("also-nope"));
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("Transaction id")));
        assert!(errors.iter().any(|e| e.contains("Account id")));
        assert!(errors.iter().any(|e| e.contains("negative")));
    }

    #[test]
    fn test_withdraw_request_builds_command() {
        let account = Uuid::new_v4();
        let request = WithdrawMoneyRequest {
            money: 25,
            transaction_id: Uuid::new_v4().to_string(),
        };

        let command = request.validate(&account.to_string()).unwrap();
        match command {
            AccountCommand::Withdraw {
                account_id, amount, ..
            } => {
                assert_eq!(account_id.as_uuid(), account);
                assert_eq!(amount.value(), 25);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_account_id_path_segment_must_be_a_uuid() {
        assert!(parse_account_id("f00").is_err());
        assert!(parse_account_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
