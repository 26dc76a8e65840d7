mod common;

use common::*;
use draftleague_core::config::{AwardConfig, SeasonConfig};
use draftleague_core::engine::{advantage, phase};
use draftleague_core::models::*;
use draftleague_core::LeagueError;
use speculate2::speculate;

fn award_for(awards: &[AdvantageAward], player_id: uuid::Uuid, source: AwardSource) -> AdvantageAward {
    awards
        .iter()
        .find(|a| a.player_id == player_id && a.awarded_via == source)
        .cloned()
        .expect("Missing award")
}

speculate! {
    describe "starting advantages" {
        before {
            let fx = fixture(3);
            fx.register_catalog();
            fx.run_draft();
            let selector = advantage::starting_selector(&fx.db, fx.season.id)
                .expect("Failed to resolve selector")
                .expect("Nobody is selecting");
        }

        it "starts with the last draft position" {
            assert_eq!(selector.draft_position, Some(3));
        }

        it "caps each tier at the configured count" {
            let item = advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "SKIP", selector.user_id)
                .expect("Failed to select");
            assert_eq!(item.origin, InventoryOrigin::Starting);
            assert_eq!(item.tier, 1);
            assert_eq!(item.status, InventoryStatus::Available);

            let err = advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "SWAP", selector.user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::CapacityExceeded(_)));
        }

        it "passes the turn once a player's quota is full" {
            advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "SKIP", selector.user_id)
                .expect("Failed to select");
            advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "DOUBLE", selector.user_id)
                .expect("Failed to select");

            let next = advantage::starting_selector(&fx.db, fx.season.id)
                .expect("Failed to resolve selector")
                .expect("Nobody is selecting");
            assert_eq!(next.draft_position, Some(2));

            let err = advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "PEEK", selector.user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::WrongTurn(_)));
        }

        it "rejects players picking out of turn" {
            let other = fx
                .players
                .iter()
                .find(|p| p.id != selector.id)
                .expect("Missing player");
            let err = advantage::select_starting_advantage(&fx.db, fx.season.id, other.id, "SKIP", other.user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::WrongTurn(_)));
        }

        it "lets the commissioner pick for anyone" {
            let other = fx
                .players
                .iter()
                .find(|p| p.id != selector.id)
                .expect("Missing player");
            advantage::select_starting_advantage(&fx.db, fx.season.id, other.id, "PEEK", fx.commissioner)
                .expect("Failed to select");
            let held = advantage::list_inventory(&fx.db, fx.season.id, Some(other.id)).expect("Failed to list");
            assert_eq!(held.len(), 1);
        }

        it "can be reset before the season starts" {
            advantage::select_starting_advantage(&fx.db, fx.season.id, selector.id, "SKIP", fx.commissioner)
                .expect("Failed to select");
            let removed = advantage::reset_starting_advantages(&fx.db, fx.season.id, fx.commissioner)
                .expect("Failed to reset");
            assert_eq!(removed, 1);
            assert!(advantage::list_inventory(&fx.db, fx.season.id, None).expect("Failed").is_empty());
        }
    }

    describe "weekly awards" {
        before {
            let fx = fixture(4);
            fx.register_catalog();
            fx.ready();
            let summary = fx.play_week(&fx.sweep_ballots("best_overall", 0));
            let winner = fx.players[0].id;
        }

        it "issues sweep and placement awards with cooldowns" {
            assert_eq!(summary.awards.len(), 5);

            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            assert_eq!(sweep.tier, 2);
            assert_eq!(sweep.reason, "sweep:best_overall");
            assert_eq!(sweep.can_use_after_week, 2);
            assert!(sweep.slot.is_pending());

            let first = award_for(&summary.awards, winner, AwardSource::Placement);
            assert_eq!(first.reason, "placement:1");
            assert_eq!(first.tier, 2);

            for player in &fx.players[1..] {
                let second = award_for(&summary.awards, player.id, AwardSource::Placement);
                assert_eq!(second.reason, "placement:2");
                assert_eq!(second.tier, 1);
                assert_eq!(second.can_use_after_week, 1);
            }
        }

        it "does not issue twice for the same week" {
            let again = advantage::issue_week_awards(&fx.db, fx.season.id, 1, fx.commissioner)
                .expect("Failed to issue");
            assert_eq!(again.len(), summary.awards.len());
            assert_eq!(advantage::list_awards(&fx.db, fx.season.id, Some(1)).expect("Failed").len(), 5);
        }

        it "fills award slots with matching codes" {
            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            let item = advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.commissioner)
                .expect("Failed to select");
            assert_eq!(item.origin, InventoryOrigin::Award);
            assert_eq!(item.award_id, Some(sweep.id));
            assert_eq!(item.can_use_after_week, 2);

            let err = advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "VETO", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::AlreadyExists(_)));

            let placement = award_for(&summary.awards, winner, AwardSource::Placement);
            let err = advantage::select_award_code(&fx.db, fx.season.id, placement.id, "DOUBLE", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::AlreadyExists(_)));
            let err = advantage::select_award_code(&fx.db, fx.season.id, placement.id, "SKIP", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
            advantage::select_award_code(&fx.db, fx.season.id, placement.id, "VETO", fx.commissioner)
                .expect("Failed to select");
        }

        it "reserves code selection to the commissioner" {
            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            let err = advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.players[0].user_id)
                .unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));
        }

        it "undoes a selection back to a pending slot" {
            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.commissioner)
                .expect("Failed to select");
            let undone = advantage::undo_selection(&fx.db, fx.season.id, sweep.id, fx.commissioner)
                .expect("Failed to undo");
            assert!(undone.slot.is_pending());
            assert!(advantage::list_inventory(&fx.db, fx.season.id, Some(winner)).expect("Failed").is_empty());
        }

        it "revokes pending awards only" {
            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.commissioner)
                .expect("Failed to select");
            let revoked = advantage::revoke_week_awards(&fx.db, fx.season.id, 1, fx.commissioner)
                .expect("Failed to revoke");
            assert_eq!(revoked, 4);
            let left = advantage::list_awards(&fx.db, fx.season.id, Some(1)).expect("Failed");
            assert_eq!(left.len(), 1);
            assert_eq!(left[0].id, sweep.id);
        }

        it "holds items back until their cooldown passes" {
            let runner_up = &fx.players[1];
            let tier1 = award_for(&summary.awards, runner_up.id, AwardSource::Placement);
            let skip = advantage::select_award_code(&fx.db, fx.season.id, tier1.id, "SKIP", fx.commissioner)
                .expect("Failed to select");
            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            let double = advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.commissioner)
                .expect("Failed to select");

            let err = advantage::play(&fx.db, fx.season.id, skip.id, runner_up.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::CapacityExceeded(_)));

            phase::start_week(&fx.db, fx.season.id, fx.commissioner).expect("Failed to start week 2");
            let played = advantage::play(&fx.db, fx.season.id, skip.id, runner_up.user_id)
                .expect("Failed to play");
            assert_eq!(played.status, InventoryStatus::Played);
            assert_eq!(played.played_week, Some(2));

            let err = advantage::play(&fx.db, fx.season.id, double.id, fx.players[0].user_id).unwrap_err();
            assert!(matches!(err, LeagueError::CapacityExceeded(_)));
            let err = advantage::play(&fx.db, fx.season.id, double.id, runner_up.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::Unauthorized(_)));

            let err = advantage::undo_selection(&fx.db, fx.season.id, tier1.id, fx.commissioner).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
            let err = advantage::play(&fx.db, fx.season.id, skip.id, runner_up.user_id).unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }
    }

    describe "held caps" {
        it "stop award selections beyond the tier cap" {
            let fx = fixture_with_config(
                4,
                SeasonConfig {
                    awards: AwardConfig {
                        max_held_per_tier: [3, 1, 1],
                        ..AwardConfig::default()
                    },
                    ..SeasonConfig::default()
                },
            );
            fx.register_catalog();
            fx.ready();
            let summary = fx.play_week(&fx.sweep_ballots("best_overall", 0));
            let winner = fx.players[0].id;

            let sweep = award_for(&summary.awards, winner, AwardSource::Sweep);
            advantage::select_award_code(&fx.db, fx.season.id, sweep.id, "DOUBLE", fx.commissioner)
                .expect("Failed to select");
            let placement = award_for(&summary.awards, winner, AwardSource::Placement);
            let err = advantage::select_award_code(&fx.db, fx.season.id, placement.id, "VETO", fx.commissioner)
                .unwrap_err();
            assert!(matches!(err, LeagueError::CapacityExceeded(_)));
        }
    }

    describe "catalog" {
        it "rejects duplicate codes and bad tiers" {
            let fx = fixture(0);
            fx.register_catalog();
            assert_eq!(advantage::catalog(&fx.db).expect("Failed").len(), 6);

            let err = advantage::register_advantage(
                &fx.db,
                CreateAdvantageInput {
                    code: "SKIP".to_string(),
                    name: "skip".to_string(),
                    tier: 1,
                    description: None,
                },
            )
            .unwrap_err();
            assert!(matches!(err, LeagueError::AlreadyExists(_)));

            let err = advantage::register_advantage(
                &fx.db,
                CreateAdvantageInput {
                    code: "NUKE".to_string(),
                    name: "nuke".to_string(),
                    tier: 4,
                    description: None,
                },
            )
            .unwrap_err();
            assert!(matches!(err, LeagueError::InvalidTransition(_)));
        }
    }
}
