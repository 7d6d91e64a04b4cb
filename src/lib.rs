//! Ball-by-ball cricket statistics: loads a league's match and delivery
//! tables and answers team, batting and bowling record queries.

pub mod assemble;
pub mod batsman_record;
pub mod bowler_record;
pub mod event;
pub mod fetch;
pub mod grouping;
pub mod metric;
pub mod ops;
pub mod resolver;
pub mod store;
pub mod synth;
pub mod team_record;
