//! Universe configuration: the ordered list of exchange symbols to screen.
//!
//! Symbols are stored fully qualified (with the exchange suffix), upper-cased
//! and de-duplicated. Order is significant: it is the tie-break order for
//! ranking and for the final presentation sort.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Suffix Yahoo uses for NSE listings.
pub const NSE_SUFFIX: &str = ".NS";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("symbol is empty")]
    EmptySymbol,

    #[error("{0} is already in the universe")]
    Duplicate(String),

    #[error("{0} is not in the universe")]
    NotFound(String),

    #[error("universe file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk shape; normalized on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UniverseFile {
    #[serde(default = "default_suffix")]
    suffix: String,
    #[serde(default)]
    symbols: Vec<String>,
}

fn default_suffix() -> String {
    NSE_SUFFIX.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UniverseFile", into = "UniverseFile")]
pub struct Universe {
    suffix: String,
    symbols: Vec<String>,
}

impl From<UniverseFile> for Universe {
    fn from(file: UniverseFile) -> Self {
        let mut universe = Universe::empty(&file.suffix);
        for symbol in file.symbols {
            // Blank and repeated entries in a hand-edited file are skipped
            let _ = universe.add(&symbol);
        }
        universe
    }
}

impl From<Universe> for UniverseFile {
    fn from(u: Universe) -> Self {
        Self {
            suffix: u.suffix,
            symbols: u.symbols,
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_nse()
    }
}

impl Universe {
    pub fn empty(suffix: &str) -> Self {
        Self {
            suffix: suffix.trim().to_uppercase(),
            symbols: Vec::new(),
        }
    }

    /// Build from a list, normalizing and de-duplicating in order.
    pub fn from_symbols<I, S>(suffix: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Universe::from(UniverseFile {
            suffix: suffix.to_string(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        })
    }

    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), UniverseError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.normalize(symbol)
            .is_some_and(|s| self.symbols.contains(&s))
    }

    /// Trim, upper-case, and append the suffix when missing.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            return None;
        }
        if self.suffix.is_empty() || symbol.ends_with(&self.suffix) {
            Some(symbol)
        } else {
            Some(format!("{symbol}{}", self.suffix))
        }
    }

    /// Append a symbol, returning its normalized form.
    pub fn add(&mut self, raw: &str) -> Result<String, UniverseError> {
        let symbol = self.normalize(raw).ok_or(UniverseError::EmptySymbol)?;
        if self.symbols.contains(&symbol) {
            return Err(UniverseError::Duplicate(symbol));
        }
        self.symbols.push(symbol.clone());
        Ok(symbol)
    }

    /// Remove a symbol, returning its normalized form.
    pub fn remove(&mut self, raw: &str) -> Result<String, UniverseError> {
        let symbol = self.normalize(raw).ok_or(UniverseError::EmptySymbol)?;
        let idx = self
            .symbols
            .iter()
            .position(|s| *s == symbol)
            .ok_or_else(|| UniverseError::NotFound(symbol.clone()))?;
        self.symbols.remove(idx);
        Ok(symbol)
    }

    /// NSE futures-and-options names.
    pub fn default_nse() -> Self {
        Self::from_symbols(NSE_SUFFIX, DEFAULT_NSE.iter().copied())
    }
}

const DEFAULT_NSE: &[&str] = &[
    "ABB", "ACC", "APLAPOLLO", "AUBANK", "AARTIIND", "ADANIENSOL", "ADANIENT", "ADANIGREEN",
    "ADANIPORTS", "ATGL", "ABCAPITAL", "ABFRL", "ALKEM", "AMBUJACEM", "ANGELONE", "APOLLOHOSP",
    "APOLLOTYRE", "ASHOKLEY", "ASIANPAINT", "ASTRAL", "AUROPHARMA", "DMART", "AXISBANK",
    "BSOFT", "BSE", "BAJAJ-AUTO", "BAJFINANCE", "BAJAJFINSV", "BALKRISIND", "BANDHANBNK",
    "BANKBARODA", "BANKINDIA", "BEL", "BHARATFORG", "BHEL", "BPCL", "BHARTIARTL", "BIOCON",
    "BOSCHLTD", "BRITANNIA", "CESC", "CGPOWER", "CANBK", "CDSL", "CHAMBLFERT", "CHOLAFIN",
    "CIPLA", "COALINDIA", "COFORGE", "COLPAL", "CAMS", "CONCOR", "CROMPTON", "CYIENT", "DLF",
    "DABUR", "DALBHARAT", "DEEPAKNTR", "DELHIVERY", "DIVISLAB", "DIXON", "DRREDDY", "ETERNAL",
    "EICHERMOT", "ESCORTS", "EXIDEIND", "NYKAA", "GAIL", "GMRAIRPORT", "GLENMARK", "GODREJCP",
    "GODREJPROP", "GRANULES", "GRASIM", "HCLTECH", "HDFCAMC", "HDFCBANK", "HDFCLIFE", "HFCL",
    "HAVELLS", "HEROMOTOCO", "HINDALCO", "HAL", "HINDCOPPER", "HINDPETRO", "HINDUNILVR",
    "HINDZINC", "ICICIBANK", "HUDCO", "ICICIGI", "ICICIPRULI", "IDFCFIRSTB", "IIFL", "IRB",
    "ITC", "INDIANB", "IEX", "IOC", "IRCTC", "IRFC", "IREDA", "IGL", "INDUSTOWER", "INDUSINDBK",
    "NAUKRI", "INFY", "INOXWIND", "INDIGO", "JSWENERGY", "JSWSTEEL", "JSL", "JINDALSTEL",
    "JIOFIN", "JUBLFOOD", "KEI", "KPITTECH", "KALYANKJIL", "KOTAKBANK", "LTF", "LICHSGFIN",
    "LTIM", "LT", "LAURUSLABS", "LICI", "LUPIN", "MRF", "LODHA", "MGL", "M&MFIN", "M&M",
    "MANAPPURAM", "MARICO", "MARUTI", "MFSL", "MAXHEALTH", "MPHASIS", "MCX", "MUTHOOTFIN",
    "NBCC", "NCC", "NHPC", "NMDC", "NTPC", "NATIONALUM", "NESTLEIND", "OBEROIRLTY", "ONGC",
    "OIL", "PAYTM", "OFSS", "POLICYBZR", "PIIND", "PNBHOUSING", "PAGEIND", "PATANJALI",
    "PERSISTENT", "PETRONET", "PIDILITIND", "PEL", "POLYCAB", "POONAWALLA", "PFC", "POWERGRID",
    "PRESTIGE", "PNB", "RBLBANK", "RECLTD", "RELIANCE", "SBICARD", "SBILIFE", "SHREECEM",
    "SJVN", "SRF", "MOTHERSON", "SHRIRAMFIN", "SIEMENS", "SOLARINDS", "SONACOMS", "SBIN",
    "SAIL", "SUNPHARMA", "SUPREMEIND", "SYNGENE", "TATACONSUM", "TITAGARH", "TVSMOTOR",
    "TATACHEM", "TATACOMM", "TCS", "TATAELXSI", "TATAMOTORS", "TATAPOWER", "TATASTEEL",
    "TATATECH", "TECHM", "FEDERALBNK", "INDHOTEL", "PHOENIXLTD", "RAMCOCEM", "TORNTPHARM",
    "TORNTPOWER", "TRENT", "TIINDIA", "UPL", "ULTRACEMCO", "UNIONBANK", "UNITDSPR", "VBL",
    "VEDL", "IDEA", "VOLTAS", "WIPRO", "YESBANK", "ZYDUSLIFE",
];
