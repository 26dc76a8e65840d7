mod common;

use common::*;
use draftleague_core::engine::{events, league, phase, weekly};
use draftleague_core::models::*;
use draftleague_core::LeagueError;
use serde_json::json;
use speculate2::speculate;

speculate! {
    before {
        let fx = fixture(4);
        fx.ready();
        let season_id = fx.season.id;
    }

    describe "challenge" {
        before {
            phase::start_week(&fx.db, season_id, fx.commissioner).expect("Failed to start week");
        }

        it "is selected once per week" {
            let selection = weekly::select_challenge(&fx.db, season_id, "Covers only", fx.commissioner)
                .expect("Failed to select");
            assert_eq!(selection.week, 1);
            let err = weekly::select_challenge(&fx.db, season_id, "Something else", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::AlreadyExists(_)));
        }

        it "must exist before the reveal" {
            let err = weekly::reveal_challenge(&fx.db, season_id, fx.commissioner).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }

        it "opens submissions when revealed" {
            weekly::select_challenge(&fx.db, season_id, "Covers only", fx.commissioner).expect("Failed");
            weekly::reveal_challenge(&fx.db, season_id, fx.commissioner).expect("Failed to reveal");
            assert_eq!(fx.season().current_phase, SeasonPhase::Submission);
        }

        it "is chosen by the commissioner" {
            let err = weekly::select_challenge(&fx.db, season_id, "Covers only", fx.players[0].user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }

    describe "submissions" {
        before {
            phase::start_week(&fx.db, season_id, fx.commissioner).expect("Failed to start week");
            weekly::select_challenge(&fx.db, season_id, "Covers only", fx.commissioner).expect("Failed");
            weekly::reveal_challenge(&fx.db, season_id, fx.commissioner).expect("Failed to reveal");
            let player = &fx.players[0];
        }

        it "replaces earlier tracks on resubmission" {
            weekly::submit_tracks(&fx.db, season_id, player.id, vec![json!({ "title": "First" })], player.user_id)
                .expect("Failed to submit");
            let second = weekly::submit_tracks(
                &fx.db,
                season_id,
                player.id,
                vec![json!({ "title": "Second" }), json!({ "title": "Third" })],
                player.user_id,
            )
            .expect("Failed to resubmit");
            assert_eq!(second.tracks.len(), 2);

            let all = weekly::list_submissions(&fx.db, season_id, 1).expect("Failed to list");
            assert_eq!(all.len(), 1);
            assert_eq!(all[0].tracks[0]["title"], "Second");
        }

        it "cannot be made for someone else" {
            let err = weekly::submit_tracks(&fx.db, season_id, player.id, vec![], fx.players[1].user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }

    describe "presentation" {
        before {
            phase::start_week(&fx.db, season_id, fx.commissioner).expect("Failed to start week");
            phase::advance(&fx.db, season_id, "presentation", fx.commissioner).expect("Failed to advance");
        }

        it "walks every player once" {
            let state = weekly::presentation(&fx.db, season_id, 1).expect("Failed to load");
            assert_eq!(state.presenter_order.len(), 4);
            assert_eq!(state.current_presenter(), Some(state.presenter_order[0]));

            let mut last = state;
            for _ in 0..4 {
                last = weekly::advance_presenter(&fx.db, season_id, fx.commissioner).expect("Failed");
            }
            assert!(last.is_complete);
            assert!(last.current_presenter().is_none());

            let err = weekly::advance_presenter(&fx.db, season_id, fx.commissioner).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }
    }

    describe "voting" {
        before {
            phase::start_week(&fx.db, season_id, fx.commissioner).expect("Failed to start week");
            phase::advance(&fx.db, season_id, "voting", fx.commissioner).expect("Failed to advance");
            let (a, b) = (&fx.players[0], &fx.players[1]);
        }

        it "opens a session with the configured categories" {
            let session = weekly::voting_session(&fx.db, season_id, 1).expect("Failed to load");
            assert_eq!(session.categories, fx.season().config.voting_categories);
            assert!(!session.is_closed);
        }

        it "rejects self votes" {
            let err = weekly::cast_vote(&fx.db, season_id, a.id, "best_overall", a.id, a.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }

        it "accepts one vote per category" {
            weekly::cast_vote(&fx.db, season_id, a.id, "best_overall", b.id, a.user_id).expect("Failed");
            weekly::cast_vote(&fx.db, season_id, a.id, "most_creative", b.id, a.user_id).expect("Failed");
            let err = weekly::cast_vote(&fx.db, season_id, a.id, "best_overall", fx.players[2].id, a.user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::AlreadyExists(_)));
        }

        it "rejects unknown categories" {
            let err = weekly::cast_vote(&fx.db, season_id, a.id, "loudest", b.id, a.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::NotFound { .. }));
        }

        it "rejects ballots cast for another voter" {
            let err = weekly::cast_vote(&fx.db, season_id, a.id, "best_overall", b.id, b.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }

    describe "finalize" {
        it "ranks the week, updates standings and ends the week" {
            let mut ballots = fx.sweep_ballots("best_overall", 0);
            ballots.push((0, "best_overall", 1));
            ballots.push((2, "most_creative", 1));
            ballots.push((3, "most_creative", 2));
            let summary = fx.play_week(&ballots);

            let placements: Vec<(uuid::Uuid, i64, u32)> = summary
                .results
                .iter()
                .map(|r| (r.player_id, r.points, r.placement))
                .collect();
            assert_eq!(placements[0], (fx.players[0].id, 3, 1));
            assert_eq!(placements[1], (fx.players[1].id, 2, 2));
            assert_eq!(placements[2], (fx.players[2].id, 1, 3));
            assert_eq!(placements[3], (fx.players[3].id, 0, 4));

            let standings = league::standings(&fx.db, season_id).expect("Failed to load standings");
            assert_eq!(standings[0].id, fx.players[0].id);
            assert_eq!(standings[0].total_points, 3);

            let season = fx.season();
            assert_eq!(season.current_phase, SeasonPhase::WeekEnd);
            assert!(weekly::voting_session(&fx.db, season_id, 1).expect("Failed").is_closed);
            assert_eq!(weekly::results(&fx.db, season_id, 1).expect("Failed").len(), 4);

            let log = events::list(&fx.db, season_id, Some(1)).expect("Failed to list events");
            assert!(log.iter().any(|e| e.event_type == EventType::WeekFinalized));
        }

        it "is reserved to the commissioner" {
            phase::start_week(&fx.db, season_id, fx.commissioner).expect("Failed to start week");
            phase::advance(&fx.db, season_id, "voting", fx.commissioner).expect("Failed to advance");
            let err = weekly::finalize_week(&fx.db, season_id, fx.players[0].user_id).unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }
    }
}
