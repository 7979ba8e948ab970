//! Nexus CLI — terminal dashboard over the aggregation store

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use tracing_subscriber::EnvFilter;

use nexus::{FavoriteKind, Refresher, Store, StoreConfig};

#[derive(Parser)]
#[command(name = "nexus", about = "Terminal weather/crypto/news dashboard", version)]
struct Cli {
    /// Cities to track (repeatable; defaults to the built-in list)
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Coin ids to track (repeatable; defaults to the built-in list)
    #[arg(long = "coin")]
    coins: Vec<String>,

    /// Seconds between full refreshes
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Forecast days per city
    #[arg(long, default_value_t = 1)]
    days: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if !cli.cities.is_empty() {
        config.cities = cli.cities;
    }
    if !cli.coins.is_empty() {
        config.coins = cli.coins;
    }
    config.refresh_interval = Duration::from_secs(cli.interval);
    config.forecast_days = cli.days;

    let store = match Store::new(config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("could not start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("fetching initial data");
    store.refresh_all();
    store.start_live_feeds();
    let mut refresher = Refresher::start(Arc::clone(&store), store.config().refresh_interval);

    terminal::enable_raw_mode()?;
    let result = run(&store);
    terminal::disable_raw_mode()?;

    refresher.stop();
    store.close_live_feeds();

    result
}

fn run(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_secs(1);
    loop {
        draw(store)?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('f') => {
                        // Pin the first configured city and coin for quick testing
                        if let Some(city) = store.config().cities.first() {
                            store.add_favorite(FavoriteKind::Cities, city);
                        }
                        if let Some(coin) = store.config().coins.first() {
                            store.add_favorite(FavoriteKind::Cryptos, coin);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

fn draw(store: &Store) -> io::Result<()> {
    let state = store.snapshot();
    let favorites = store.favorites();

    let mut out = io::stdout();
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;

    let mut line = |text: &str| -> io::Result<()> { write!(out, "{}\r\n", text) };

    line(&format!("Nexus v{}  ('q' quit, 'f' favorite)", env!("CARGO_PKG_VERSION")))?;
    line("")?;

    line("Weather")?;
    for city in &store.config().cities {
        let star = if favorites.cities.contains(city) { "*" } else { " " };
        match state.weather.get(city) {
            Some(w) => {
                let condition = w.weather.first().map(|c| c.main.as_str()).unwrap_or("---");
                line(&format!(
                    " {}{:<12} {:>6.1}°C  feels {:>5.1}°C  {:>3.0}%RH  {}",
                    star, city, w.main.temp, w.main.feels_like, w.main.humidity, condition
                ))?;
            }
            None => line(&format!(" {}{:<12} ---", star, city))?,
        }
    }
    line("")?;

    line("Crypto")?;
    for id in &store.config().coins {
        let star = if favorites.cryptos.contains(id) { "*" } else { " " };
        match state.crypto.get(id) {
            Some(c) => {
                let live = state
                    .live_prices
                    .get(id)
                    .map(|p| format!("  live {:.2}", p))
                    .unwrap_or_default();
                let change = c
                    .price_change_percentage_24h
                    .map(|p| format!("{:+.2}%", p))
                    .unwrap_or_else(|| "---".to_string());
                line(&format!(
                    " {}{:<10} {:>12.2} USD  {:>8} 24h{}",
                    star, c.symbol, c.current_price, change, live
                ))?;
            }
            None => line(&format!(" {}{:<10} ---", star, id))?,
        }
    }
    line("")?;

    if !state.trades.is_empty() {
        line("Last trades")?;
        let mut bases: Vec<_> = state.trades.keys().collect();
        bases.sort();
        for base in bases {
            let t = &state.trades[base];
            line(&format!(
                "  {:<10} {:>12.2} USD  {:<4} vol {:.4}",
                base, t.price, t.direction, t.volume
            ))?;
        }
        line("")?;
    }

    line("News")?;
    if state.news.is_empty() {
        line("  ---")?;
    }
    for article in &state.news {
        line(&format!("  - {}", article.title))?;
    }

    out.flush()
}
