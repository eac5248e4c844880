use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },
    #[error("amount would overflow the balance")]
    AmountOverflow,
    #[error("invalid menu choice {0:?}")]
    InvalidMenuChoice(String),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// Process-local balance. No persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    balance: i64,
}

impl Account {
    pub fn new(balance: i64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Succeeds iff `amount <= balance`; returns the new balance.
    pub fn withdraw(&mut self, amount: i64) -> Result<i64, SessionError> {
        if amount > self.balance {
            return Err(SessionError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(SessionError::AmountOverflow)?;
        Ok(self.balance)
    }

    /// Adds `amount` unconditionally (zero and negative included).
    pub fn deposit(&mut self, amount: i64) -> Result<i64, SessionError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(SessionError::AmountOverflow)?;
        Ok(self.balance)
    }
}

/// Parse an operator-typed amount.
pub fn parse_amount(input: &str) -> Result<i64, SessionError> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| SessionError::InvalidAmount(trimmed.to_string()))
}
