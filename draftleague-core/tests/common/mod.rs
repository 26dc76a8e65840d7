#![allow(dead_code)]

use draftleague_core::config::SeasonConfig;
use draftleague_core::db::Database;
use draftleague_core::engine::{advantage, draft, league, phase, weekly};
use draftleague_core::models::*;
use uuid::Uuid;

/// A migrated in-memory league with one season and its players.
pub struct Fixture {
    pub db: Database,
    pub commissioner: Uuid,
    pub league: League,
    pub season: Season,
    pub players: Vec<SeasonPlayer>,
}

pub fn fixture(player_count: usize) -> Fixture {
    fixture_with_config(player_count, SeasonConfig::default())
}

pub fn fixture_with_config(player_count: usize, config: SeasonConfig) -> Fixture {
    let db = Database::open_memory().expect("Failed to create in-memory database");
    db.migrate().expect("Failed to run migrations");

    let commissioner = Uuid::new_v4();
    let league = league::create_league(
        &db,
        CreateLeagueInput {
            name: "Friday Night League".to_string(),
            commissioner_id: commissioner,
        },
    )
    .expect("Failed to create league");
    let season = league::create_season(
        &db,
        league.id,
        CreateSeasonInput {
            name: "Season 1".to_string(),
            config: Some(config),
        },
        commissioner,
    )
    .expect("Failed to create season");

    let players = (0..player_count)
        .map(|i| {
            league::add_player(
                &db,
                season.id,
                AddSeasonPlayerInput {
                    user_id: Uuid::new_v4(),
                    display_name: format!("Player {}", i + 1),
                },
                commissioner,
            )
            .expect("Failed to add player")
        })
        .collect();

    Fixture {
        db,
        commissioner,
        league,
        season,
        players,
    }
}

impl Fixture {
    pub fn season(&self) -> Season {
        league::overview(&self.db, self.season.id)
            .expect("Failed to load season")
            .season
    }

    pub fn player(&self, player_id: Uuid) -> &SeasonPlayer {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .expect("Unknown player")
    }

    pub fn user_of(&self, player_id: Uuid) -> Uuid {
        self.player(player_id).user_id
    }

    pub fn add_prompts(&self, count: usize) -> Vec<DraftPrompt> {
        let category = league::add_category(
            &self.db,
            self.season.id,
            CreateCategoryInput {
                name: format!("Category {}", Uuid::new_v4()),
            },
            self.commissioner,
        )
        .expect("Failed to add category");
        (0..count)
            .map(|i| {
                league::add_prompt(
                    &self.db,
                    self.season.id,
                    CreatePromptInput {
                        category_id: category.id,
                        text: format!("Prompt {}", i + 1),
                    },
                    self.commissioner,
                )
                .expect("Failed to add prompt")
            })
            .collect()
    }

    pub fn open_prompt(&self) -> DraftPrompt {
        league::list_prompts(&self.db, self.season.id)
            .expect("Failed to list prompts")
            .into_iter()
            .find(|p| p.status == PromptStatus::Open)
            .expect("No open prompt left")
    }

    /// Run the whole draft as the commissioner. Ends in advantage selection.
    pub fn run_draft(&self) -> DraftState {
        self.add_prompts(DRAFT_ROUNDS as usize + 4);
        draft::initialize(&self.db, self.season.id, self.commissioner)
            .expect("Failed to initialize draft");
        let mut pick = 0;
        loop {
            let board = draft::board(&self.db, self.season.id).expect("Failed to load board");
            if board.state.is_complete {
                return board.state;
            }
            let prompt = match board.round_prompt {
                Some(prompt) => prompt,
                None => draft::select_prompt(
                    &self.db,
                    self.season.id,
                    self.open_prompt().id,
                    self.commissioner,
                )
                .expect("Failed to select prompt"),
            };
            pick += 1;
            draft::draft_artist(
                &self.db,
                self.season.id,
                prompt.id,
                &format!("Draft Artist {pick}"),
                self.commissioner,
            )
            .expect("Failed to draft artist");
        }
    }

    pub fn register_catalog(&self) {
        for (code, tier) in [
            ("SKIP", 1),
            ("SWAP", 1),
            ("PEEK", 1),
            ("DOUBLE", 2),
            ("VETO", 2),
            ("STEAL", 3),
        ] {
            advantage::register_advantage(
                &self.db,
                CreateAdvantageInput {
                    code: code.to_string(),
                    name: code.to_lowercase(),
                    tier,
                    description: None,
                },
            )
            .expect("Failed to register advantage");
        }
    }

    /// Draft, then move to `Ready`.
    pub fn ready(&self) {
        self.run_draft();
        phase::advance(&self.db, self.season.id, "ready", self.commissioner)
            .expect("Failed to advance to ready");
    }

    /// Start the next week and play it through to `WeekEnd`.
    ///
    /// `ballots` are `(voter, category, nominee)` player indexes.
    pub fn play_week(&self, ballots: &[(usize, &str, usize)]) -> weekly::WeekSummary {
        let season_id = self.season.id;
        phase::start_week(&self.db, season_id, self.commissioner).expect("Failed to start week");
        weekly::select_challenge(&self.db, season_id, "Songs about rain", self.commissioner)
            .expect("Failed to select challenge");
        weekly::reveal_challenge(&self.db, season_id, self.commissioner)
            .expect("Failed to reveal challenge");
        for player in &self.players {
            weekly::submit_tracks(
                &self.db,
                season_id,
                player.id,
                vec![serde_json::json!({ "title": format!("{} track", player.display_name) })],
                player.user_id,
            )
            .expect("Failed to submit");
        }
        phase::advance(&self.db, season_id, "presentation", self.commissioner)
            .expect("Failed to advance to presentation");
        for _ in &self.players {
            weekly::advance_presenter(&self.db, season_id, self.commissioner)
                .expect("Failed to advance presenter");
        }
        phase::advance(&self.db, season_id, "voting", self.commissioner)
            .expect("Failed to advance to voting");
        for (voter, category, nominee) in ballots {
            let voter = &self.players[*voter];
            weekly::cast_vote(
                &self.db,
                season_id,
                voter.id,
                category,
                self.players[*nominee].id,
                voter.user_id,
            )
            .expect("Failed to cast vote");
        }
        weekly::finalize_week(&self.db, season_id, self.commissioner).expect("Failed to finalize")
    }

    /// Every other player votes for `nominee` in `category`.
    pub fn sweep_ballots(&self, category: &'static str, nominee: usize) -> Vec<(usize, &'static str, usize)> {
        (0..self.players.len())
            .filter(|voter| *voter != nominee)
            .map(|voter| (voter, category, nominee))
            .collect()
    }

    pub fn roster_entries(&self) -> Vec<RosterEntry> {
        self.db
            .read(|conn| draftleague_core::db::roster::list_entries(conn, self.season.id))
            .expect("Failed to list roster entries")
    }
}
