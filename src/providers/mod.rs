pub mod exchange_rate;
pub mod fred;
pub mod smtp;
pub mod yahoo_finance;

pub use exchange_rate::ExchangeRateApiProvider;
pub use fred::FredProvider;
pub use smtp::SmtpNotifier;
pub use yahoo_finance::YahooFinanceProvider;
