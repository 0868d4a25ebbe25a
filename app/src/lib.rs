pub mod account;
mod credential;
pub mod database;
pub mod ledger;
pub mod money;

#[cfg(test)]
pub(crate) mod test_support;
