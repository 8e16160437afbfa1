use boxscore::{EngineError, PlayByPlay, PlayerGameStats, TeamGameStats};
use chrono::NaiveDate;
use nba_stats_api::{PbpTable, read_csv, read_csv_from};
use std::path::Path;

const DEN: u64 = 1610612743;
const LAC: u64 = 1610612746;

fn fixture() -> PbpTable {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/synthetic_game.csv");
    read_csv(&path).expect("fixture should load")
}

fn game() -> PlayByPlay {
    PlayByPlay::new(&fixture()).expect("fixture should normalize")
}

fn player(rows: &[PlayerGameStats], id: u64) -> &PlayerGameStats {
    rows.iter()
        .find(|r| r.player_id == id)
        .unwrap_or_else(|| panic!("no row for player {id}"))
}

fn team(rows: &[TeamGameStats], id: u64) -> &TeamGameStats {
    rows.iter()
        .find(|r| r.team_id == id)
        .unwrap_or_else(|| panic!("no row for team {id}"))
}

#[test]
fn context_comes_from_the_team_columns() {
    let game = game();
    assert_eq!(game.home_team(), "DEN");
    assert_eq!(game.away_team(), "LAC");
    assert_eq!(game.home_team_id(), DEN);
    assert_eq!(game.away_team_id(), LAC);
    assert_eq!(game.game_date(), NaiveDate::from_ymd_opt(2007, 11, 30).unwrap());
    assert_eq!(game.season(), 2008);
    assert_eq!(game.game_id(), "0020700233");
}

#[test]
fn player_box_score_for_an_away_starter() {
    let rows = game().playerbygamestats();
    let row = player(&rows, 201);

    assert_eq!(row.player_name.as_deref(), Some("Corey Maggette"));
    assert_eq!(row.team_id, LAC);
    assert_eq!(row.team_abbrev, "LAC");
    assert_eq!(
        (row.fgm, row.fga, row.tpm, row.tpa, row.ftm, row.fta, row.points),
        (1, 1, 0, 0, 1, 1, 3)
    );
    assert_eq!((row.oreb, row.dreb), (1, 1));
    assert_eq!((row.ast, row.blk, row.stl, row.tov, row.pf), (0, 0, 0, 0, 0));
    assert_eq!(row.plus_minus, -2);
    assert_eq!(row.toc, 1440);
    assert_eq!(row.toc_string, "24:00");
    assert_eq!(row.poss, 9);
    assert_eq!(row.opponent, DEN);
    assert_eq!(row.opponent_abbrev, "DEN");
    assert_eq!(row.is_home, 0);
}

#[test]
fn substitutes_only_get_their_minutes() {
    let rows = game().playerbygamestats();

    let carter = player(&rows, 105);
    assert_eq!((carter.toc, carter.toc_string.as_str()), (200, "03:20"));
    assert_eq!((carter.plus_minus, carter.poss), (1, 3));

    let smith = player(&rows, 106);
    assert_eq!((smith.fgm, smith.fga, smith.tpm, smith.tpa, smith.points), (2, 3, 1, 1, 5));
    assert_eq!((smith.toc, smith.toc_string.as_str()), (1240, "20:40"));
    assert_eq!((smith.plus_minus, smith.poss), (1, 4));
    assert_eq!(smith.is_home, 1);

    let cassell = player(&rows, 203);
    assert_eq!((cassell.toc, cassell.plus_minus, cassell.poss), (740, 2, 5));
    // A technical picked up on the bench is not a personal foul.
    assert_eq!((cassell.tov, cassell.pf), (1, 0));

    let thornton = player(&rows, 206);
    assert_eq!((thornton.toc, thornton.toc_string.as_str()), (700, "11:40"));
    assert_eq!((thornton.plus_minus, thornton.poss), (-4, 4));
}

#[test]
fn secondary_credits_land_on_the_right_players() {
    let rows = game().playerbygamestats();

    let iverson = player(&rows, 101);
    assert_eq!((iverson.ast, iverson.stl, iverson.pf), (1, 1, 1));
    // A technical free throw still counts as a free throw.
    assert_eq!((iverson.ftm, iverson.fta, iverson.points), (1, 1, 3));

    let camby = player(&rows, 103);
    assert_eq!((camby.blk, camby.ast, camby.fgm, camby.fga), (1, 1, 0, 2));

    let mobley = player(&rows, 202);
    assert_eq!((mobley.stl, mobley.blk), (1, 0));
}

#[test]
fn team_box_scores() {
    let rows = game().teambygamestats();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team_id, DEN, "home team first");

    let den = team(&rows, DEN);
    assert_eq!(
        (den.fgm, den.fga, den.tpm, den.tpa, den.ftm, den.fta),
        (4, 7, 2, 2, 1, 1)
    );
    assert_eq!((den.points_for, den.points_against), (11, 9));
    // The only offensive board is a team rebound.
    assert_eq!((den.oreb, den.dreb), (1, 2));
    assert_eq!((den.ast, den.blk, den.stl, den.tov, den.pf), (3, 1, 1, 1, 3));
    assert_eq!(den.plus_minus, 2);
    assert_eq!((den.toc, den.toc_string.as_str()), (1440, "24:00"));
    assert_eq!(den.poss, 7);
    assert_eq!((den.opponent, den.opponent_abbrev.as_str(), den.is_home), (LAC, "LAC", 1));

    let lac = team(&rows, LAC);
    assert_eq!(
        (lac.fgm, lac.fga, lac.tpm, lac.tpa, lac.ftm, lac.fta),
        (3, 6, 1, 2, 2, 3)
    );
    assert_eq!((lac.points_for, lac.points_against), (9, 11));
    assert_eq!((lac.oreb, lac.dreb), (1, 2));
    // Includes the shot clock violation charged to the team.
    assert_eq!((lac.ast, lac.blk, lac.stl, lac.tov, lac.pf), (2, 0, 1, 2, 0));
    assert_eq!(lac.plus_minus, -2);
    assert_eq!(lac.poss, 9);
    assert_eq!(lac.is_home, 0);
}

#[test]
fn shooting_splits_are_consistent() {
    for row in game().playerbygamestats() {
        assert!(row.fga >= row.fgm, "player {}", row.player_id);
        assert!(row.tpa >= row.tpm, "player {}", row.player_id);
        assert!(row.fta >= row.ftm, "player {}", row.player_id);
        assert!(row.tpm <= row.fgm, "player {}", row.player_id);
        assert_eq!(row.points, 2 * row.fgm + row.tpm + row.ftm);
    }
}

#[test]
fn every_player_gets_exactly_one_row() {
    let rows = game().playerbygamestats();
    let ids: Vec<u64> = rows.iter().map(|r| r.player_id).collect();
    assert_eq!(ids, vec![101, 102, 103, 104, 105, 106, 201, 202, 203, 204, 205, 206]);

    // No team placeholder sneaks in as a player.
    assert!(rows.iter().all(|r| r.player_id != LAC && r.player_id != DEN));

    let carter = player(&rows, 105);
    assert_eq!((carter.blk, carter.stl, carter.ast, carter.oreb, carter.dreb), (0, 0, 0, 0, 0));
}

#[test]
fn plus_minus_is_conserved() {
    let game = game();
    let players = game.playerbygamestats();
    assert_eq!(players.iter().map(|r| r.plus_minus).sum::<i64>(), 0);

    let teams = game.teambygamestats();
    let (den, lac) = (team(&teams, DEN), team(&teams, LAC));
    assert_eq!(den.plus_minus, -lac.plus_minus);
    assert_eq!(den.plus_minus, i64::from(den.points_for) - i64::from(lac.points_for));
}

#[test]
fn time_on_court_is_bounded_and_round_trips() {
    let game = game();
    let total = team(&game.teambygamestats(), DEN).toc;
    for row in game.playerbygamestats() {
        assert!(row.toc <= total, "player {}", row.player_id);
        assert_eq!(boxscore::clock::parse_toc(&row.toc_string), Some(row.toc));
    }
    let on_court: u32 = game
        .playerbygamestats()
        .iter()
        .filter(|r| r.is_home == 1)
        .map(|r| r.toc)
        .sum();
    assert_eq!(on_court, 5 * total);
}

#[test]
fn aggregators_are_idempotent() {
    let game = game();
    assert_eq!(game.playerbygamestats(), game.playerbygamestats());
    assert_eq!(game.teambygamestats(), game.teambygamestats());
    assert_eq!(game.player_plus_minus(), game.player_plus_minus());
    assert_eq!(game.team_possessions(), game.team_possessions());
}

#[test]
fn duplicated_rebound_row_counts_once() {
    let game = game();
    assert_eq!(game.events().len(), fixture().len() - 1);

    let rows = game.playerbygamestats();
    assert_eq!(player(&rows, 204).dreb, 1);
    assert_eq!(team(&game.teambygamestats(), LAC).dreb, 2);
}

#[test]
fn category_tables_agree_with_the_composite() {
    let game = game();
    let rows = game.playerbygamestats();
    for (key, shooting) in game.player_shooting() {
        let row = player(&rows, key.player_id);
        assert_eq!(row.team_id, key.team_id);
        assert_eq!((row.fgm, row.fga, row.points), (shooting.fgm, shooting.fga, shooting.points));
    }
    for (key, toc) in game.player_time_on_court() {
        assert_eq!(player(&rows, key.player_id).toc_string, toc.toc_string);
    }
}

#[test]
fn no_team_roles_and_no_jump_ball_is_missing_context() {
    let csv = "game_id,game_date,period,seconds_elapsed,event_type_de,event_team,player1_id,player1_team_id\n\
               0020700233,2007-11-30,1,15,shot,1610612743,101,1610612743\n";
    let table = read_csv_from(csv.as_bytes(), "inline").expect("valid csv");
    assert!(matches!(PlayByPlay::new(&table), Err(EngineError::MissingContext(_))));
}

#[test]
fn missing_period_column_is_a_schema_error() {
    let csv = "game_id,seconds_elapsed,event_type_de,event_team\n\
               0020700233,15,shot,1610612743\n";
    let table = read_csv_from(csv.as_bytes(), "inline").expect("valid csv");
    match PlayByPlay::new(&table) {
        Err(EngineError::Schema { column, row: None, .. }) => assert_eq!(column, "period"),
        other => panic!("expected a schema error, got {other:?}"),
    }
}

const TAGS: &str = "game_id,game_date,season,home_team_id,away_team_id,home_team_abbrev,away_team_abbrev";
const DEN_AT_LAC_TAGS: &str = "0020700233,2007-11-30,2008,1610612743,1610612746,DEN,LAC";

fn inline_game(columns: &str, rows: &[&str]) -> PlayByPlay {
    let mut csv = format!("{TAGS},{columns}\n");
    for row in rows {
        csv.push_str(&format!("{DEN_AT_LAC_TAGS},{row}\n"));
    }
    let table = read_csv_from(csv.as_bytes(), "inline").expect("valid csv");
    PlayByPlay::new(&table).expect("valid game")
}

#[test]
fn team_rebound_logged_as_a_player_slot_counts_for_the_team() {
    let game = inline_game(
        "period,seconds_elapsed,event_type_de,player1_id,player1_team_id",
        &[
            "1,10,missed_shot,101,1610612743",
            "1,12,rebound,1610612743,",
        ],
    );
    let rebounds = game.team_rebounds();
    assert_eq!((rebounds[&DEN].oreb, rebounds[&DEN].dreb), (1, 0));
    assert_eq!((rebounds[&LAC].oreb, rebounds[&LAC].dreb), (0, 0));
    assert!(game.player_rebounds().is_empty());
}

#[test]
fn period_ending_after_a_basket_closes_the_opponents_possession() {
    let game = inline_game(
        "period,seconds_elapsed,event_type_de,event_team,player1_id,player1_team_id",
        &[
            "1,700,shot,1610612743,101,1610612743",
            "1,720,period-end,,,",
        ],
    );
    let poss = game.team_possessions();
    assert_eq!((poss[&DEN], poss[&LAC]), (1, 1));
}
