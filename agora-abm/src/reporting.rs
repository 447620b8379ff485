//! CSV reporting sink
//!
//! One set of append-only files per run. Analysis output is best-effort:
//! write failures are logged and swallowed, the simulation never stops for
//! them.

use agora_core::{Price, Quantity, Side};
use agora_exchange::{OrderId, ReportingSink};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Floor for mid-prices entering the log-impact calculation
const IMPACT_EPSILON: f64 = 1e-4;

pub struct CsvReportingSink {
    mid_prices: BufWriter<File>,
    trades: BufWriter<File>,
    order_sides: BufWriter<File>,
    price_impacts: BufWriter<File>,
}

impl CsvReportingSink {
    /// Open the four per-run output files inside `dir`.
    pub fn create(dir: &Path, run: u32) -> io::Result<Self> {
        let open = |name: String| -> io::Result<BufWriter<File>> {
            Ok(BufWriter::new(File::create(dir.join(name))?))
        };
        Ok(Self {
            mid_prices: open(format!("apxr_mid_prices{run}.csv"))?,
            trades: open(format!("apxr_trades{run}.csv"))?,
            order_sides: open(format!("apxr_order_sides{run}.csv"))?,
            price_impacts: open(format!("apxr_price_impacts{run}.csv"))?,
        })
    }

    fn log_write_error(stream: &str, err: &io::Error) {
        warn!(stream, error = %err, "reporting write failed; continuing");
    }
}

impl ReportingSink for CsvReportingSink {
    fn mid_price(&mut self, _timestep: u64, mid: Price) {
        if let Err(e) = writeln!(self.mid_prices, "{:.2}", mid.to_f64()) {
            Self::log_write_error("mid_prices", &e);
        }
    }

    fn trade(&mut self, price: Price) {
        if let Err(e) = writeln!(self.trades, "{:.2}", price.to_f64()) {
            Self::log_write_error("trades", &e);
        }
    }

    fn order_side(&mut self, side: Side) {
        if let Err(e) = writeln!(self.order_sides, "{}", side.as_index()) {
            Self::log_write_error("order_sides", &e);
        }
    }

    fn price_impact(
        &mut self,
        _timestep: u64,
        _order_id: OrderId,
        volume: Quantity,
        mid_before: Price,
        mid_after: Price,
    ) {
        let impact = mid_after.to_f64().max(IMPACT_EPSILON).ln()
            - mid_before.to_f64().max(IMPACT_EPSILON).ln();
        if let Err(e) = writeln!(self.price_impacts, "{},{:.6}", volume.raw(), impact) {
            Self::log_write_error("price_impacts", &e);
        }
    }

    fn flush(&mut self) {
        for (stream, writer) in [
            ("mid_prices", &mut self.mid_prices),
            ("trades", &mut self.trades),
            ("order_sides", &mut self.order_sides),
            ("price_impacts", &mut self.price_impacts),
        ] {
            if let Err(e) = writer.flush() {
                Self::log_write_error(stream, &e);
            }
        }
    }
}

/// Wipe and recreate the output directory. Called once per simulation.
pub fn prepare_output_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_exchange::ReportingSink as _;
    use std::fs;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("agora-sink-{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_creates_per_run_files() {
        let dir = temp_dir("create");
        let mut sink = CsvReportingSink::create(&dir, 3).unwrap();
        sink.flush();

        for name in [
            "apxr_mid_prices3.csv",
            "apxr_trades3.csv",
            "apxr_order_sides3.csv",
            "apxr_price_impacts3.csv",
        ] {
            assert!(dir.join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn test_rows_and_formats() {
        let dir = temp_dir("rows");
        let mut sink = CsvReportingSink::create(&dir, 0).unwrap();

        sink.mid_price(0, Price::from_f64(100.005));
        sink.trade(Price::from_f64(100.01));
        sink.order_side(Side::Sell);
        sink.price_impact(
            0,
            1,
            Quantity::new(500),
            Price::from_f64(100.00),
            Price::from_f64(100.02),
        );
        sink.flush();

        let mids = fs::read_to_string(dir.join("apxr_mid_prices0.csv")).unwrap();
        assert_eq!(mids.lines().count(), 1);

        let trades = fs::read_to_string(dir.join("apxr_trades0.csv")).unwrap();
        assert_eq!(trades.trim(), "100.01");

        let sides = fs::read_to_string(dir.join("apxr_order_sides0.csv")).unwrap();
        assert_eq!(sides.trim(), "1");

        let impacts = fs::read_to_string(dir.join("apxr_price_impacts0.csv")).unwrap();
        let row = impacts.trim();
        assert!(row.starts_with("500,"));
        let impact: f64 = row.split(',').nth(1).unwrap().parse().unwrap();
        assert!((impact - (100.02f64.ln() - 100.00f64.ln())).abs() < 1e-6);
    }

    #[test]
    fn test_prepare_output_dir_wipes() {
        let dir = temp_dir("wipe");
        fs::write(dir.join("stale.csv"), "old").unwrap();

        prepare_output_dir(&dir).unwrap();
        assert!(dir.exists());
        assert!(!dir.join("stale.csv").exists());
    }
}
