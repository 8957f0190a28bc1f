//! Trade record set persistence port.

use crate::domain::error::TradeQaError;
use crate::domain::trade::TradeRecord;

pub trait DataPort {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, TradeQaError>;

    /// Replace any previously saved record set.
    fn save_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError>;
}
