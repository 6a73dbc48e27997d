pub mod feed;
pub mod tick_loop;

pub use feed::SyntheticFeed;
pub use tick_loop::TickLoop;
