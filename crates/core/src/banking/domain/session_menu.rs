use std::str::FromStr;

use crate::audit::domain::audit_event::AuditEvent;
use crate::audit::domain::audit_sink::AuditSink;

use super::account::{Account, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    CheckBalance,
    Withdraw,
    Deposit,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::CheckBalance),
            "2" => Ok(MenuChoice::Withdraw),
            "3" => Ok(MenuChoice::Deposit),
            "4" => Ok(MenuChoice::Exit),
            other => Err(SessionError::InvalidMenuChoice(other.to_string())),
        }
    }
}

pub const MENU_TEXT: &str = "1. Check balance\n2. Withdraw\n3. Deposit\n4. Exit";

/// Balance operations for an authenticated user. Every successful
/// operation emits one audit event attributed to `user`; failures emit
/// none.
pub struct SessionMenu<'a> {
    user: &'a str,
    account: &'a mut Account,
    audit: &'a mut dyn AuditSink,
}

impl<'a> SessionMenu<'a> {
    pub fn new(user: &'a str, account: &'a mut Account, audit: &'a mut dyn AuditSink) -> Self {
        Self {
            user,
            account,
            audit,
        }
    }

    pub fn check_balance(&mut self) -> i64 {
        let balance = self.account.balance();
        log::info!("{} checked balance: {balance}", self.user);
        self.audit.append(AuditEvent::balance_check(self.user, balance));
        balance
    }

    pub fn withdraw(&mut self, amount: i64) -> Result<i64, SessionError> {
        let balance = self.account.withdraw(amount)?;
        log::info!("{} withdrew {amount}, balance {balance}", self.user);
        self.audit.append(AuditEvent::withdraw(self.user, amount));
        Ok(balance)
    }

    pub fn deposit(&mut self, amount: i64) -> Result<i64, SessionError> {
        let balance = self.account.deposit(amount)?;
        log::info!("{} deposited {amount}, balance {balance}", self.user);
        self.audit.append(AuditEvent::deposit(self.user, amount));
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::audit_sink::MemoryAuditSink;
    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(MenuChoice::CheckBalance))]
    #[case("2", Ok(MenuChoice::Withdraw))]
    #[case(" 3\n", Ok(MenuChoice::Deposit))]
    #[case("4", Ok(MenuChoice::Exit))]
    #[case("5", Err(SessionError::InvalidMenuChoice("5".into())))]
    #[case("x", Err(SessionError::InvalidMenuChoice("x".into())))]
    fn test_parse_choice(#[case] input: &str, #[case] expected: Result<MenuChoice, SessionError>) {
        assert_eq!(input.parse::<MenuChoice>(), expected);
    }

    #[test]
    fn test_operations_emit_one_event_each() {
        let mut account = Account::new(5000);
        let mut audit = MemoryAuditSink::new();
        let mut menu = SessionMenu::new("Gopal", &mut account, &mut audit);

        assert_eq!(menu.check_balance(), 5000);
        assert_eq!(menu.withdraw(2000), Ok(3000));
        assert_eq!(menu.deposit(500), Ok(3500));

        assert_eq!(
            audit.statuses(),
            vec!["BALANCE CHECK: 5000", "WITHDRAW: 2000", "DEPOSIT: 500"]
        );
        assert!(audit.events().iter().all(|e| e.user == "Gopal"));
        assert_eq!(account.balance(), 3500);
    }

    #[test]
    fn test_failed_withdraw_is_not_audited() {
        let mut account = Account::new(5000);
        let mut audit = MemoryAuditSink::new();
        let mut menu = SessionMenu::new("Gopal", &mut account, &mut audit);

        assert!(matches!(
            menu.withdraw(6000),
            Err(SessionError::InsufficientFunds { .. })
        ));
        assert!(audit.events().is_empty());
        assert_eq!(account.balance(), 5000);
    }

    #[test]
    fn test_zero_deposit_is_audited() {
        let mut account = Account::new(10);
        let mut audit = MemoryAuditSink::new();
        SessionMenu::new("Gopal", &mut account, &mut audit)
            .deposit(0)
            .unwrap();
        assert_eq!(audit.statuses(), vec!["DEPOSIT: 0"]);
    }
}
