//! Portfolio bookkeeping.

/// Cash balance and share holdings of a single-instrument portfolio.
///
/// Buys and sells are clamped to what the balance and holdings allow, so
/// the balance never goes negative and holdings never go short.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    init_balance: f32,
    balance: f32,
    shares_owned: u32,
    cost_basis: f32,
}

impl Portfolio {
    /// Creates a portfolio holding only cash.
    pub fn new(init_balance: f32) -> Self {
        Self {
            init_balance,
            balance: init_balance,
            shares_owned: 0,
            cost_basis: 0.0,
        }
    }

    /// Returns the cash balance.
    pub fn balance(&self) -> f32 {
        self.balance
    }

    /// Returns the number of shares held.
    pub fn shares_owned(&self) -> u32 {
        self.shares_owned
    }

    /// Returns the average price paid per held share.
    pub fn cost_basis(&self) -> f32 {
        self.cost_basis
    }

    /// Returns the balance the portfolio started with.
    pub fn init_balance(&self) -> f32 {
        self.init_balance
    }

    /// Buys up to `shares` shares at `price`, limited by the balance.
    pub fn buy(&mut self, shares: u32, price: f32) {
        let affordable = if price > 0.0 {
            (self.balance / price) as u32
        } else {
            0
        };
        let shares = shares.min(affordable);
        if shares == 0 {
            return;
        }

        let cost = shares as f32 * price;
        let total = self.shares_owned + shares;
        self.cost_basis = (self.cost_basis * self.shares_owned as f32 + cost) / total as f32;
        self.balance -= cost;
        self.shares_owned = total;
    }

    /// Sells up to `shares` shares at `price`, limited by the holdings.
    pub fn sell(&mut self, shares: u32, price: f32) {
        let shares = shares.min(self.shares_owned);
        self.balance += shares as f32 * price;
        self.shares_owned -= shares;
        if self.shares_owned == 0 {
            self.cost_basis = 0.0;
        }
    }

    /// Returns the balance plus the holdings valued at `price`.
    pub fn net_worth(&self, price: f32) -> f32 {
        self.balance + self.shares_owned as f32 * price
    }

    /// Returns the net worth relative to the initial balance.
    pub fn profit(&self, price: f32) -> f32 {
        self.net_worth(price) - self.init_balance
    }
}
