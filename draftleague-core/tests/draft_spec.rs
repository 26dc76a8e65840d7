mod common;

use common::*;
use draftleague_core::engine::{advantage, draft, league};
use draftleague_core::models::*;
use draftleague_core::LeagueError;
use speculate2::speculate;

speculate! {
    before {
        let fx = fixture(4);
        let prompts = fx.add_prompts(10);
    }

    describe "initialize" {
        it "assigns a permutation of the players and positions 1..N" {
            let state = draft::initialize(&fx.db, fx.season.id, fx.commissioner)
                .expect("Failed to initialize");
            assert_eq!(state.current_round, 1);
            assert_eq!(state.current_picker_index, 0);
            assert!(!state.is_complete);

            let mut drafted = state.draft_order.clone();
            drafted.sort();
            let mut enrolled: Vec<_> = fx.players.iter().map(|p| p.id).collect();
            enrolled.sort();
            assert_eq!(drafted, enrolled);

            let players = league::list_players(&fx.db, fx.season.id).expect("Failed to list");
            for player in players {
                let slot = state.draft_order.iter().position(|id| *id == player.id).unwrap();
                assert_eq!(player.draft_position, Some(slot as u32 + 1));
            }
            assert_eq!(fx.season().current_phase, SeasonPhase::Drafting);
        }

        it "returns the existing state when called twice" {
            let first = draft::initialize(&fx.db, fx.season.id, fx.commissioner).expect("Failed");
            let second = draft::initialize(&fx.db, fx.season.id, fx.commissioner).expect("Failed");
            assert_eq!(first.draft_order, second.draft_order);
        }

        it "fails without players" {
            let empty = fixture(0);
            let err = draft::initialize(&empty.db, empty.season.id, empty.commissioner).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }

        it "is reserved to the commissioner" {
            let err = draft::initialize(&fx.db, fx.season.id, fx.players[0].user_id).unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }

    describe "turns" {
        before {
            let state = draft::initialize(&fx.db, fx.season.id, fx.commissioner).expect("Failed");
            let first = state.draft_order[0];
            let second = state.draft_order[1];
        }

        it "lets the current picker select the round prompt" {
            let prompt = draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.user_of(first))
                .expect("Failed to select prompt");
            assert_eq!(prompt.status, PromptStatus::Selected);
            assert_eq!(prompt.selected_by_player_id, Some(first));
            assert_eq!(prompt.selected_at_round, Some(1));
        }

        it "rejects players out of turn" {
            let err = draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.user_of(second))
                .unwrap_err();
            assert!(matches!(err, LeagueError::WrongTurn(_)));
        }

        it "rejects prompts that are not open" {
            draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.commissioner).expect("Failed");
            let err = draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::PromptUnavailable(_)));
        }

        it "requires the round prompt to draft" {
            let err = draft::draft_artist(&fx.db, fx.season.id, prompts[1].id, "Nina Simone", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::PromptUnavailable(_)));
        }

        it "rejects an artist already on an active roster" {
            draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.commissioner).expect("Failed");
            draft::draft_artist(&fx.db, fx.season.id, prompts[0].id, "Nina Simone", fx.user_of(first))
                .expect("Failed to draft");
            let err = draft::draft_artist(&fx.db, fx.season.id, prompts[0].id, "nina simone", fx.user_of(second))
                .unwrap_err();
            assert!(matches!(err, LeagueError::DuplicateArtist(_)));

            let board = draft::board(&fx.db, fx.season.id).expect("Failed to load board");
            assert_eq!(board.current_picker_id, Some(second));
            assert_eq!(board.picks.len(), 1);
        }

        it "snakes back after every player picked in round 1" {
            draft::select_prompt(&fx.db, fx.season.id, prompts[0].id, fx.user_of(first)).expect("Failed");
            for (i, player_id) in state.draft_order.iter().enumerate() {
                draft::draft_artist(
                    &fx.db,
                    fx.season.id,
                    prompts[0].id,
                    &format!("Artist {i}"),
                    fx.user_of(*player_id),
                )
                .expect("Failed to draft");
            }

            let board = draft::board(&fx.db, fx.season.id).expect("Failed to load board");
            assert_eq!(board.state.current_round, 2);
            assert_eq!(board.state.current_picker_index, 3);
            assert_eq!(board.current_picker_id, Some(state.draft_order[3]));
            assert!(board.round_prompt.is_none());

            let prompts_now = league::list_prompts(&fx.db, fx.season.id).expect("Failed to list");
            let played = prompts_now.iter().find(|p| p.id == prompts[0].id).unwrap();
            assert_eq!(played.status, PromptStatus::Retired);
            assert!(played.selected_by_player_id.is_none());
            assert!(played.selected_at_round.is_none());
        }
    }

    describe "completion" {
        it "hands over to advantage selection after round 8" {
            let state = fx.run_draft();
            assert!(state.is_complete);
            assert_eq!(state.current_round, DRAFT_ROUNDS);

            let board = draft::board(&fx.db, fx.season.id).expect("Failed to load board");
            assert_eq!(board.picks.len(), 4 * DRAFT_ROUNDS as usize);
            assert!(board.current_picker_id.is_none());
            assert_eq!(fx.season().current_phase, SeasonPhase::AdvantageSelection);

            let entries = fx.roster_entries();
            assert_eq!(entries.len(), 32);
            assert!(entries.iter().all(|e| e.acquired_via == AcquiredVia::Draft && e.acquired_at_week == 0));
        }
    }

    describe "reset" {
        it "wipes picks and rosters but can keep the order" {
            let done = fx.run_draft();
            let state = draft::reset(&fx.db, fx.season.id, true, fx.commissioner).expect("Failed to reset");

            assert_eq!(state.draft_order, done.draft_order);
            assert_eq!(state.current_round, 1);
            assert!(fx.roster_entries().is_empty());
            let board = draft::board(&fx.db, fx.season.id).expect("Failed to load board");
            assert!(board.picks.is_empty());
            let prompts_now = league::list_prompts(&fx.db, fx.season.id).expect("Failed to list");
            assert!(prompts_now.iter().all(|p| p.status == PromptStatus::Open));
            assert_eq!(fx.season().current_phase, SeasonPhase::Drafting);
        }

        it "drops starting advantages picked under the old order" {
            fx.run_draft();
            fx.register_catalog();
            let selector = advantage::starting_selector(&fx.db, fx.season.id)
                .expect("Failed to load selector")
                .expect("Missing selector");
            advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "SKIP", fx.commissioner)
                .expect("Failed to select");
            assert_eq!(fx.season().current_phase, SeasonPhase::AdvantageSelection);

            draft::reset(&fx.db, fx.season.id, false, fx.commissioner).expect("Failed to reset");

            assert!(advantage::list_inventory(&fx.db, fx.season.id, None).expect("Failed").is_empty());
            assert_eq!(fx.season().current_phase, SeasonPhase::Drafting);
        }

        it "is reserved to the commissioner" {
            draft::initialize(&fx.db, fx.season.id, fx.commissioner).expect("Failed");
            let err = draft::reset(&fx.db, fx.season.id, false, fx.players[0].user_id).unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }
}
