use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use configuration::{LedgerConfig, ReversalCommission};
use core_types::{Bar, Direction, Order, Position, PositionBook, Trade};
use rust_decimal::Decimal;

/// Manages the state of a trading account: cash, open positions and the
/// append-only order and trade logs.
///
/// Cash is the single source of truth for available funds; it is only ever
/// changed by [`execute`](PositionLedger::execute).
#[derive(Debug, Clone)]
pub struct PositionLedger {
    config: LedgerConfig,
    cash: Decimal,
    positions: PositionBook,
    orders: Vec<Order>,
    trades: Vec<Trade>,
}

impl PositionLedger {
    /// Creates a ledger funded with `config.initial_cash`.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            cash: config.initial_cash,
            config,
            positions: PositionBook::new(),
            orders: Vec::new(),
            trades: Vec::new(),
        }
    }

    /// Cost of `order` and the funds available to cover it, as used by the
    /// margin check.
    ///
    /// With an open position the cost is that of the resulting net position,
    /// and the position's collateral (less the commission to unwind it) counts
    /// as available.
    fn margin(&self, order: &Order) -> (Decimal, Decimal) {
        let commission = self.config.commission;
        let leveraged_cash = self.cash * self.config.leverage;

        match self.positions.get(&order.symbol) {
            Some(position) => {
                let net = position.quantity + order.quantity;
                let required = net.abs() * order.price + commission;
                let available =
                    leveraged_cash + position.average_price * position.quantity.abs() - commission;
                (required, available)
            }
            None => (order.notional() + commission, leveraged_cash),
        }
    }

    /// Returns `true` when `order` would overdraw the account. A cost exactly
    /// equal to the available funds is accepted.
    pub fn check_overdraft(&self, order: &Order) -> bool {
        let (required, available) = self.margin(order);
        required > available
    }

    /// Applies a market order at its own price.
    ///
    /// Returns the realised [`Trade`] when the order reduced, closed or reversed
    /// an existing position, `None` when it opened or added to one. Rejected
    /// orders leave every part of the ledger untouched and are not logged.
    pub fn execute(&mut self, order: &Order) -> Result<Option<Trade>, LedgerError> {
        if order.quantity.is_zero() {
            tracing::warn!(symbol = %order.symbol, "Order quantity cannot be 0");
            return Err(LedgerError::InvalidOrder);
        }

        let (required, available) = self.margin(order);
        if required > available {
            tracing::warn!(
                symbol = %order.symbol,
                quantity = %order.quantity,
                price = %order.price,
                %required,
                %available,
                "Insufficient funds for order"
            );
            return Err(LedgerError::InsufficientFunds { required, available });
        }

        let commission = self.config.commission;
        // The sign of the quantity is authoritative for the order's side.
        let side = Direction::from_quantity(order.quantity);

        let trade = match self.positions.get_mut(&order.symbol) {
            None => {
                self.positions.insert(
                    order.symbol.clone(),
                    Position::new(order.symbol.clone(), order.quantity, order.price),
                );
                self.cash -= order.notional() + commission;
                None
            }
            Some(position) if position.direction == side => {
                let net = position.quantity + order.quantity;
                position.average_price = (position.quantity * position.average_price
                    + order.quantity * order.price)
                    / net;
                position.set_quantity(net);
                self.cash -= order.notional() + commission;
                None
            }
            Some(position) => {
                let entry_price = position.average_price;
                let reducible = order.quantity.abs().min(position.quantity.abs());
                let closed = match position.direction {
                    Direction::Sell => -reducible,
                    _ => reducible,
                };
                let pnl = closed * (order.price - entry_price) - commission;

                // Collateral comes back together with the net result of the close.
                self.cash += closed.abs() * entry_price + pnl + commission;

                let net = position.quantity + order.quantity;
                if order.quantity.abs() > position.quantity.abs() {
                    let opening_commission = match self.config.reversal_commission {
                        ReversalCommission::PerLeg => commission,
                        ReversalCommission::Once => Decimal::ZERO,
                    };
                    self.cash -= net.abs() * order.price + opening_commission;
                    position.average_price = order.price;
                }
                position.set_quantity(net);

                tracing::info!(
                    symbol = %order.symbol,
                    closed = %closed,
                    entry = %entry_price,
                    exit = %order.price,
                    pnl = %pnl,
                    "Logged trade"
                );

                let trade = Trade {
                    order: order.clone(),
                    quantity: closed,
                    entry_price,
                    pnl,
                    commission,
                };
                self.trades.push(trade.clone());
                Some(trade)
            }
        };

        if self
            .positions
            .get(&order.symbol)
            .is_some_and(|position| position.quantity.is_zero())
        {
            self.positions.remove(&order.symbol);
        }

        tracing::debug!(
            symbol = %order.symbol,
            quantity = %order.quantity,
            price = %order.price,
            cash = %self.cash,
            "Order executed"
        );
        self.orders.push(order.clone());

        Ok(trade)
    }

    /// Flattens every open position with a market order at `bar.close`.
    ///
    /// The symbol set is snapshotted first because each fill removes its
    /// position from the book. A liquidation order that fails the margin check
    /// is logged and its position is left open.
    pub fn close_all_positions(&mut self, bar: &Bar) -> Vec<Trade> {
        let symbols: Vec<String> = self.positions.keys().cloned().collect();
        let mut trades = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let Some(quantity) = self.positions.get(&symbol).map(|p| p.quantity) else {
                continue;
            };
            let order = Order::market(bar.timestamp, symbol.clone(), bar.close, -quantity);
            match self.execute(&order) {
                Ok(Some(trade)) => trades.push(trade),
                Ok(None) => {}
                Err(e) => tracing::error!(%symbol, error = %e, "Failed to liquidate position"),
            }
        }

        trades
    }

    /// Absolute value of all open positions at the bar's close.
    ///
    /// Every position is marked at the same close, so this is only meaningful
    /// while the book holds a single instrument.
    pub fn invested_value(&self, bar: &Bar) -> Decimal {
        self.positions
            .values()
            .map(|position| position.quantity.abs() * bar.close)
            .sum()
    }

    /// Cash plus invested value.
    pub fn total_equity(&self, bar: &Bar) -> Decimal {
        self.invested_value(bar) + self.cash
    }

    /// Sum of the PnL of every logged trade.
    pub fn realized_pnl(&self) -> Decimal {
        self.trades.iter().map(|trade| trade.pnl).sum()
    }

    /// Mark-to-market PnL of the open positions at the bar's close.
    ///
    /// One commission is deducted per position, as if it were closed right
    /// now, so the figure matches what closing would realise.
    pub fn unrealized_pnl(&self, bar: &Bar) -> Decimal {
        self.positions
            .values()
            .map(|position| position.gross_pnl_at(bar.close) - self.config.commission)
            .sum()
    }

    /// Available cash.
    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn positions(&self) -> &PositionBook {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Every accepted order, oldest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Accepted orders stamped at or after `from`.
    pub fn orders_since(&self, from: DateTime<Utc>) -> Vec<&Order> {
        self.orders.iter().filter(|order| order.timestamp >= from).collect()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn config() -> LedgerConfig {
        LedgerConfig {
            initial_cash: dec!(100000),
            commission: dec!(2.7),
            leverage: dec!(1),
            reversal_commission: ReversalCommission::PerLeg,
        }
    }

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn order(hour: i64, price: Decimal, quantity: Decimal) -> Order {
        Order::market(ts(hour), "NQ", price, quantity)
    }

    fn bar(close: Decimal) -> Bar {
        Bar {
            symbol: "NQ".to_string(),
            timestamp: ts(100),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1),
        }
    }

    #[test]
    fn opening_long_debits_notional_and_commission() {
        let mut ledger = PositionLedger::new(config());
        let trade = ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();

        assert!(trade.is_none());
        assert_eq!(ledger.cash(), dec!(98997.30));
        let position = ledger.position("NQ").unwrap();
        assert_eq!(position.quantity, dec!(10));
        assert_eq!(position.average_price, dec!(100));
        assert_eq!(position.direction, Direction::Buy);
        assert_eq!(ledger.orders().len(), 1);
    }

    #[test]
    fn closing_realises_pnl_and_removes_position() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        let trade = ledger
            .execute(&order(1, dec!(110), dec!(-10)))
            .unwrap()
            .expect("close produces a trade");

        assert_eq!(trade.pnl, dec!(97.30));
        assert_eq!(trade.quantity, dec!(10));
        assert_eq!(trade.entry_price, dec!(100));
        assert_eq!(trade.exit_price(), dec!(110));
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.cash(), dec!(100097.30));
        assert_eq!(ledger.realized_pnl(), dec!(97.30));
    }

    #[test]
    fn reversal_adopts_order_price_and_charges_each_leg() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        let trade = ledger
            .execute(&order(1, dec!(110), dec!(-20)))
            .unwrap()
            .expect("reversal closes the long leg");

        assert_eq!(trade.pnl, dec!(97.30));
        let position = ledger.position("NQ").unwrap();
        assert_eq!(position.quantity, dec!(-10));
        assert_eq!(position.average_price, dec!(110));
        assert_eq!(position.direction, Direction::Sell);
        assert_eq!(ledger.cash(), dec!(98994.60));

        // Flat again: equity is initial cash plus everything realised.
        ledger.close_all_positions(&bar(dec!(110)));
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.realized_pnl(), dec!(94.60));
        assert_eq!(ledger.cash(), dec!(100000) + ledger.realized_pnl());
    }

    #[test]
    fn reversal_charged_once_leaves_one_commission_in_cash() {
        let mut ledger = PositionLedger::new(LedgerConfig {
            reversal_commission: ReversalCommission::Once,
            ..config()
        });
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        ledger.execute(&order(1, dec!(110), dec!(-20))).unwrap();
        assert_eq!(ledger.cash(), dec!(98997.30));

        ledger.close_all_positions(&bar(dec!(110)));
        assert_eq!(ledger.cash(), dec!(100000) + ledger.realized_pnl() + dec!(2.7));
    }

    #[test]
    fn overdraft_boundary_is_inclusive() {
        let ledger = PositionLedger::new(config());
        // 1000 * 99.9973 + 2.7 == 100000 exactly.
        assert!(!ledger.check_overdraft(&order(0, dec!(99.9973), dec!(1000))));
        assert!(ledger.check_overdraft(&order(0, dec!(99.9974), dec!(1000))));

        let mut ledger = ledger;
        ledger.execute(&order(0, dec!(99.9973), dec!(1000))).unwrap();
        assert_eq!(ledger.cash(), Decimal::ZERO);
    }

    #[test]
    fn reversal_at_exact_margin_is_accepted() {
        let mut ledger = PositionLedger::new(LedgerConfig {
            initial_cash: dec!(1000),
            commission: Decimal::ZERO,
            ..config()
        });
        ledger.execute(&order(0, dec!(100), dec!(5))).unwrap();
        assert_eq!(ledger.cash(), dec!(500));

        // Net short 10 needs 1000; cash 500 plus the 500 of collateral released.
        let reversal = order(1, dec!(100), dec!(-15));
        assert!(!ledger.check_overdraft(&reversal));
        ledger.execute(&reversal).unwrap();

        assert_eq!(ledger.cash(), Decimal::ZERO);
        let position = ledger.position("NQ").unwrap();
        assert_eq!(position.quantity, dec!(-10));
        assert_eq!(position.average_price, dec!(100));
        assert_eq!(position.direction, Direction::Sell);
    }

    #[test]
    fn reversal_one_tick_over_margin_is_rejected() {
        let mut ledger = PositionLedger::new(LedgerConfig {
            initial_cash: dec!(1000),
            commission: Decimal::ZERO,
            ..config()
        });
        ledger.execute(&order(0, dec!(100), dec!(5))).unwrap();

        let reversal = order(1, dec!(100.01), dec!(-15));
        assert!(ledger.check_overdraft(&reversal));
        let err = ledger.execute(&reversal).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { required, available }
                if required == dec!(1000.1) && available == dec!(1000)
        ));
        assert_eq!(ledger.cash(), dec!(500));
        assert_eq!(ledger.position("NQ").unwrap().quantity, dec!(5));
        assert_eq!(ledger.orders().len(), 1);
    }

    #[test]
    fn leverage_scales_available_cash() {
        let mut ledger = PositionLedger::new(LedgerConfig {
            initial_cash: dec!(1000),
            leverage: dec!(2),
            ..config()
        });
        assert!(ledger.execute(&order(0, dec!(100), dec!(15))).is_ok());
        assert_eq!(ledger.cash(), dec!(-502.7));
    }

    #[test]
    fn rejected_orders_leave_ledger_untouched() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();

        assert_eq!(
            ledger.execute(&order(1, dec!(100), Decimal::ZERO)),
            Err(LedgerError::InvalidOrder)
        );
        let err = ledger.execute(&order(2, dec!(100), dec!(5000))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

        assert_eq!(ledger.cash(), dec!(98997.30));
        assert_eq!(ledger.orders().len(), 1);
        assert!(ledger.trades().is_empty());
        assert_eq!(ledger.position("NQ").unwrap().quantity, dec!(10));
    }

    #[test]
    fn same_direction_add_averages_the_entry() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        let trade = ledger.execute(&order(1, dec!(120), dec!(10))).unwrap();

        assert!(trade.is_none());
        let position = ledger.position("NQ").unwrap();
        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.average_price, dec!(110));
        assert_eq!(ledger.cash(), dec!(97794.60));
    }

    #[test]
    fn partial_reduce_keeps_the_entry_basis() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(110), dec!(20))).unwrap();
        let trade = ledger
            .execute(&order(1, dec!(130), dec!(-5)))
            .unwrap()
            .expect("reduce produces a trade");

        assert_eq!(trade.quantity, dec!(5));
        assert_eq!(trade.pnl, dec!(97.3));
        let position = ledger.position("NQ").unwrap();
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.average_price, dec!(110));
        assert!(position.is_long());
    }

    #[test]
    fn short_round_trip_profits_from_a_fall() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(-10))).unwrap();
        assert_eq!(ledger.cash(), dec!(98997.30));
        assert_eq!(ledger.position("NQ").unwrap().direction, Direction::Sell);

        let trade = ledger.execute(&order(1, dec!(90), dec!(10))).unwrap().unwrap();
        assert_eq!(trade.quantity, dec!(-10));
        assert_eq!(trade.pnl, dec!(97.3));
        assert_eq!(ledger.cash(), dec!(100097.30));
    }

    #[test]
    fn valuation_marks_open_positions_at_the_close() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        let bar = bar(dec!(105));

        assert_eq!(ledger.invested_value(&bar), dec!(1050));
        assert_eq!(ledger.total_equity(&bar), dec!(100047.30));
        assert_eq!(ledger.unrealized_pnl(&bar), dec!(47.3));
        assert_eq!(ledger.realized_pnl(), Decimal::ZERO);
    }

    #[test]
    fn close_all_flattens_every_position() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(10))).unwrap();
        ledger.execute(&Order::market(ts(1), "ES", dec!(50), dec!(-4))).unwrap();

        let trades = ledger.close_all_positions(&bar(dec!(110)));
        assert_eq!(trades.len(), 2);
        assert!(ledger.positions().is_empty());
        assert!(trades.iter().all(|trade| trade.order.price == dec!(110)));
    }

    #[test]
    fn orders_since_filters_by_timestamp() {
        let mut ledger = PositionLedger::new(config());
        ledger.execute(&order(0, dec!(100), dec!(1))).unwrap();
        ledger.execute(&order(5, dec!(100), dec!(1))).unwrap();
        ledger.execute(&order(9, dec!(100), dec!(-2))).unwrap();

        assert_eq!(ledger.orders_since(ts(5)).len(), 2);
        assert!(ledger.orders_since(ts(10)).is_empty());
    }
}
