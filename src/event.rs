use std::sync::Arc;

/// Per-match metadata shared by every delivery of that match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchMeta {
    pub id: u32,
    pub season: String,
    /// Round label, either a plain match number or a stage name such as
    /// "Final".
    pub match_number: String,
    pub team1: String,
    pub team2: String,
    /// None for no-result and abandoned matches.
    pub winner: Option<String>,
    pub player_of_match: Option<String>,
    pub team1_players: Vec<String>,
    pub team2_players: Vec<String>,
}

impl MatchMeta {
    /// The side that is not `team`. Falls back to team1 for a name that
    /// played in neither side.
    pub fn opponent_of(&self, team: &str) -> &str {
        if self.team1 == team {
            &self.team2
        } else {
            &self.team1
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    pub fn is_final(&self) -> bool {
        self.match_number == "Final"
    }
}

/// Extra-run classification of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraType {
    None,
    Wide,
    NoBall,
    Bye,
    LegBye,
    Penalty,
}

impl ExtraType {
    /// Maps a raw source token. Empty and `NA` cells mean an ordinary
    /// delivery; unknown tokens are rejected so bad data fails at load.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "" | "NA" => Some(ExtraType::None),
            "wides" => Some(ExtraType::Wide),
            "noballs" => Some(ExtraType::NoBall),
            "byes" => Some(ExtraType::Bye),
            "legbyes" => Some(ExtraType::LegBye),
            "penalty" => Some(ExtraType::Penalty),
            _ => None,
        }
    }
}

/// How a wicket fell. Only present on wicket deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissalKind {
    Caught,
    CaughtAndBowled,
    Bowled,
    Stumped,
    Lbw,
    HitWicket,
    RunOut,
    RetiredHurt,
    RetiredOut,
    ObstructingField,
}

impl DismissalKind {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "caught" => Some(DismissalKind::Caught),
            "caught and bowled" => Some(DismissalKind::CaughtAndBowled),
            "bowled" => Some(DismissalKind::Bowled),
            "stumped" => Some(DismissalKind::Stumped),
            "lbw" => Some(DismissalKind::Lbw),
            "hit wicket" => Some(DismissalKind::HitWicket),
            "run out" => Some(DismissalKind::RunOut),
            "retired hurt" => Some(DismissalKind::RetiredHurt),
            "retired out" => Some(DismissalKind::RetiredOut),
            "obstructing the field" => Some(DismissalKind::ObstructingField),
            _ => None,
        }
    }

    /// Run-outs, retirements and obstruction belong to the fielding side,
    /// not the bowler.
    pub fn credits_bowler(self) -> bool {
        matches!(
            self,
            DismissalKind::Caught
                | DismissalKind::CaughtAndBowled
                | DismissalKind::Bowled
                | DismissalKind::Stumped
                | DismissalKind::Lbw
                | DismissalKind::HitWicket
        )
    }
}

/// One ball of one innings, as recorded in the source log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub match_id: u32,
    pub innings: u8,
    pub over: u8,
    pub ball_number: u8,
    pub batter: String,
    pub bowler: String,
    pub non_striker: String,
    pub extra: ExtraType,
    pub batter_runs: u8,
    pub extra_runs: u8,
    pub total_runs: u8,
    /// Set when a 4 or 6 off the bat was run rather than hit to the rope
    /// (overthrows); such balls do not count as boundaries.
    pub non_boundary: bool,
    pub is_wicket: bool,
    pub player_out: Option<String>,
    pub dismissal: Option<DismissalKind>,
    pub fielders: Option<String>,
    pub batting_team: String,
}

/// A delivery joined to its match metadata. The join happens once at load;
/// every downstream computation reads borrowed slices of these rows.
#[derive(Debug, Clone)]
pub struct EnrichedEvent {
    pub delivery: Delivery,
    pub meta: Arc<MatchMeta>,
}

impl EnrichedEvent {
    pub fn match_id(&self) -> u32 {
        self.delivery.match_id
    }

    pub fn season(&self) -> &str {
        &self.meta.season
    }

    /// Side bowling this delivery.
    pub fn bowling_team(&self) -> &str {
        self.meta.opponent_of(&self.delivery.batting_team)
    }

    /// A wide does not count as a ball faced by the striker; a no-ball
    /// still does.
    pub fn counts_ball_faced(&self) -> bool {
        self.delivery.extra != ExtraType::Wide
    }

    /// Legal deliveries for bowling figures exclude wides and no-balls.
    pub fn legal_delivery(&self) -> bool {
        !matches!(self.delivery.extra, ExtraType::Wide | ExtraType::NoBall)
    }

    /// Runs charged to the bowler: the full delivery total, except that
    /// penalties, byes and leg-byes are not bowling errors and charge 0.
    pub fn bowler_runs(&self) -> i64 {
        match self.delivery.extra {
            ExtraType::Penalty | ExtraType::Bye | ExtraType::LegBye => 0,
            _ => i64::from(self.delivery.total_runs),
        }
    }

    /// Whether this delivery's wicket is credited to the bowler.
    pub fn bowler_wicket(&self) -> bool {
        self.delivery.is_wicket
            && self
                .delivery
                .dismissal
                .is_some_and(DismissalKind::credits_bowler)
    }

    pub fn boundary_four(&self) -> bool {
        self.delivery.batter_runs == 4 && !self.delivery.non_boundary
    }

    pub fn boundary_six(&self) -> bool {
        self.delivery.batter_runs == 6 && !self.delivery.non_boundary
    }

    pub fn dismissed(&self, player: &str) -> bool {
        self.delivery.player_out.as_deref() == Some(player)
    }
}

/// Seasons spanning two calendar years carry a fixed single-year label.
pub fn canonical_season(raw: &str) -> &str {
    match raw {
        "2007/08" => "2008",
        "2009/10" => "2010",
        "2020/21" => "2020",
        other => other,
    }
}
