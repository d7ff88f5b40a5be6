//! Player account and trade execution.
//!
//! Trades evaluate against the instrument price as of the last completed
//! tick; they never advance the tick or touch history. A rejected trade
//! leaves the account untouched.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use types::{Cash, Price, Quantity, Symbol, TradeSide};

use crate::instrument::Instrument;

// =============================================================================
// TradeRejected
// =============================================================================

/// Reasons the ledger refuses a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TradeRejected {
    /// Share count must be strictly positive.
    NonPositiveShares,
    /// No instrument with that symbol exists.
    UnknownSymbol(Symbol),
    /// Buy cost (including fee) exceeds available cash.
    InsufficientFunds { required: Cash, available: Cash },
    /// Sell exceeds current holdings and short selling is disabled.
    InsufficientHoldings { held: i64, requested: u64 },
}

impl fmt::Display for TradeRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeRejected::NonPositiveShares => write!(f, "share count must be positive"),
            TradeRejected::UnknownSymbol(s) => write!(f, "unknown symbol: {}", s),
            TradeRejected::InsufficientFunds {
                required,
                available,
            } => write!(
                f,
                "insufficient funds: need {}, have {}",
                required, available
            ),
            TradeRejected::InsufficientHoldings { held, requested } => write!(
                f,
                "insufficient holdings: hold {}, tried to sell {}",
                held, requested
            ),
        }
    }
}

impl std::error::Error for TradeRejected {}

// =============================================================================
// FeePolicy
// =============================================================================

/// Trading-fee configuration: a flat percentage of the base cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub enabled: bool,
    /// Fee as a percentage of base cost (1.0 = 1%).
    pub percent: f64,
}

impl FeePolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            percent: 0.0,
        }
    }

    pub fn percent(percent: f64) -> Self {
        Self {
            enabled: true,
            percent,
        }
    }

    /// Fee on a base cost, rounded to the cent.
    pub fn fee_on(&self, base: Cash) -> Cash {
        if self.enabled {
            Cash::from_float(base.to_float() * self.percent / 100.0)
        } else {
            Cash::ZERO
        }
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

// =============================================================================
// Account
// =============================================================================

/// The player's cash and holdings.
///
/// Holdings are signed: short selling (when enabled) drives them negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    cash: Cash,
    holdings: HashMap<Symbol, i64>,
}

impl Account {
    pub fn new(starting_cash: Cash) -> Self {
        Self {
            cash: starting_cash,
            holdings: HashMap::new(),
        }
    }

    pub fn cash(&self) -> Cash {
        self.cash
    }

    /// Signed share count for a symbol (0 when never traded).
    pub fn position(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// All non-zero positions.
    pub fn positions(&self) -> impl Iterator<Item = (&Symbol, i64)> {
        self.holdings.iter().filter(|(_, &n)| n != 0).map(|(s, &n)| (s, n))
    }

    /// Adjust cash by a signed amount, flooring the result at zero.
    pub fn add_funds(&mut self, delta: Cash) {
        self.cash = (self.cash + delta).max(Cash::ZERO);
    }

    /// Mark-to-market value of the holdings at current prices.
    pub fn portfolio_value(&self, instruments: &[Instrument]) -> Cash {
        self.holdings
            .iter()
            .filter_map(|(symbol, &shares)| {
                instruments
                    .iter()
                    .find(|i| &i.symbol == symbol)
                    .map(|i| Cash(i.price.raw() * shares))
            })
            .sum()
    }

    /// Cash plus portfolio value.
    pub fn equity(&self, instruments: &[Instrument]) -> Cash {
        self.cash + self.portfolio_value(instruments)
    }
}

// =============================================================================
// Trade execution
// =============================================================================

/// Record of an executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub symbol: Symbol,
    pub side: TradeSide,
    pub shares: Quantity,
    /// Execution price (last completed tick).
    pub price: Price,
    /// Fee charged, zero when fees are disabled.
    pub fee: Cash,
    /// Cash movement: debit for buys, credit for sells.
    pub total: Cash,
}

impl fmt::Display for TradeReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {} (fee {}, total {})",
            self.side, self.shares, self.symbol, self.price, self.fee, self.total
        )
    }
}

/// Validate and execute a trade against the account.
///
/// `allow_short` bypasses the holdings check on sells, letting positions
/// go negative. Rejections leave the account untouched.
pub fn execute_trade(
    account: &mut Account,
    instruments: &[Instrument],
    symbol: &str,
    side: TradeSide,
    shares: Quantity,
    fees: FeePolicy,
    allow_short: bool,
) -> Result<TradeReceipt, TradeRejected> {
    if shares.is_zero() {
        return Err(TradeRejected::NonPositiveShares);
    }

    let instrument = instruments
        .iter()
        .find(|i| i.symbol == symbol)
        .ok_or_else(|| TradeRejected::UnknownSymbol(symbol.to_string()))?;

    let price = instrument.price;
    let base = price * shares;
    let fee = fees.fee_on(base);

    match side {
        TradeSide::Buy => {
            let total = base + fee;
            if account.cash < total {
                return Err(TradeRejected::InsufficientFunds {
                    required: total,
                    available: account.cash,
                });
            }
            account.cash -= total;
            *account.holdings.entry(symbol.to_string()).or_insert(0) += shares.raw() as i64;
            Ok(TradeReceipt {
                symbol: symbol.to_string(),
                side,
                shares,
                price,
                fee,
                total,
            })
        }
        TradeSide::Sell => {
            let held = account.position(symbol);
            if !allow_short && held < shares.raw() as i64 {
                return Err(TradeRejected::InsufficientHoldings {
                    held,
                    requested: shares.raw(),
                });
            }
            let proceeds = base - fee;
            account.cash += proceeds;
            *account.holdings.entry(symbol.to_string()).or_insert(0) -= shares.raw() as i64;
            Ok(TradeReceipt {
                symbol: symbol.to_string(),
                side,
                shares,
                price,
                fee,
                total: proceeds,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::generate_roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster_with_price(price: f64) -> Vec<Instrument> {
        let mut roster = generate_roster(&mut StdRng::seed_from_u64(1));
        for instr in roster.iter_mut() {
            instr.price = Price::from_float(price);
        }
        roster
    }

    #[test]
    fn test_buy_then_sell_round_trip_without_fees() {
        let roster = roster_with_price(73.21);
        let mut account = Account::new(Cash::from_float(100_000.0));

        execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity(100),
            FeePolicy::disabled(),
            false,
        )
        .unwrap();
        assert_eq!(account.position("TECH"), 100);

        execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Sell,
            Quantity(100),
            FeePolicy::disabled(),
            false,
        )
        .unwrap();

        assert_eq!(account.cash(), Cash::from_float(100_000.0));
        assert_eq!(account.position("TECH"), 0);
    }

    #[test]
    fn test_buy_with_one_percent_fee() {
        let roster = roster_with_price(50.0);
        let mut account = Account::new(Cash::from_float(100_000.0));

        let receipt = execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity(10),
            FeePolicy::percent(1.0),
            false,
        )
        .unwrap();

        // cost = 500 * 1.01 = 505.00
        assert_eq!(receipt.fee, Cash::from_float(5.0));
        assert_eq!(receipt.total, Cash::from_float(505.0));
        assert_eq!(account.cash(), Cash::from_float(99_495.0));
        assert_eq!(account.position("TECH"), 10);
    }

    #[test]
    fn test_sell_fee_reduces_proceeds() {
        let roster = roster_with_price(50.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity(10),
            FeePolicy::disabled(),
            false,
        )
        .unwrap();

        let receipt = execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Sell,
            Quantity(10),
            FeePolicy::percent(1.0),
            false,
        )
        .unwrap();

        // proceeds = 500 - 5 = 495.00
        assert_eq!(receipt.total, Cash::from_float(495.0));
        assert_eq!(account.cash(), Cash::from_float(995.0));
    }

    #[test]
    fn test_buy_rejected_on_insufficient_funds() {
        let roster = roster_with_price(100.0);
        let mut account = Account::new(Cash::from_float(50.0));

        let err = execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity(1),
            FeePolicy::disabled(),
            false,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TradeRejected::InsufficientFunds {
                required: Cash::from_float(100.0),
                available: Cash::from_float(50.0),
            }
        );
        // No state mutation on rejection.
        assert_eq!(account.cash(), Cash::from_float(50.0));
        assert_eq!(account.position("TECH"), 0);
    }

    #[test]
    fn test_sell_rejected_without_holdings() {
        let roster = roster_with_price(100.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        let err = execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Sell,
            Quantity(5),
            FeePolicy::disabled(),
            false,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TradeRejected::InsufficientHoldings {
                held: 0,
                requested: 5
            }
        );
        assert_eq!(account.cash(), Cash::from_float(1_000.0));
    }

    #[test]
    fn test_short_selling_drives_holdings_negative() {
        let roster = roster_with_price(100.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Sell,
            Quantity(5),
            FeePolicy::disabled(),
            true,
        )
        .unwrap();

        assert_eq!(account.position("TECH"), -5);
        assert_eq!(account.cash(), Cash::from_float(1_500.0));
    }

    #[test]
    fn test_zero_shares_rejected() {
        let roster = roster_with_price(100.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        let err = execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity::ZERO,
            FeePolicy::disabled(),
            false,
        )
        .unwrap_err();
        assert_eq!(err, TradeRejected::NonPositiveShares);
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let roster = roster_with_price(100.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        let err = execute_trade(
            &mut account,
            &roster,
            "NOPE",
            TradeSide::Buy,
            Quantity(1),
            FeePolicy::disabled(),
            false,
        )
        .unwrap_err();
        assert_eq!(err, TradeRejected::UnknownSymbol("NOPE".to_string()));
    }

    #[test]
    fn test_add_funds_floors_at_zero() {
        let mut account = Account::new(Cash::from_float(100.0));

        account.add_funds(Cash::from_float(50.0));
        assert_eq!(account.cash(), Cash::from_float(150.0));

        account.add_funds(Cash::from_float(-500.0));
        assert_eq!(account.cash(), Cash::ZERO);
    }

    #[test]
    fn test_equity_marks_to_market() {
        let roster = roster_with_price(10.0);
        let mut account = Account::new(Cash::from_float(1_000.0));

        execute_trade(
            &mut account,
            &roster,
            "TECH",
            TradeSide::Buy,
            Quantity(50),
            FeePolicy::disabled(),
            false,
        )
        .unwrap();

        assert_eq!(account.portfolio_value(&roster), Cash::from_float(500.0));
        assert_eq!(account.equity(&roster), Cash::from_float(1_000.0));

        // A short position subtracts from portfolio value.
        execute_trade(
            &mut account,
            &roster,
            "OILD",
            TradeSide::Sell,
            Quantity(20),
            FeePolicy::disabled(),
            true,
        )
        .unwrap();
        assert_eq!(account.portfolio_value(&roster), Cash::from_float(300.0));
    }
}
