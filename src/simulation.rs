//! Simulation context: grid, player and pending input, advanced one tick at a time.

use crate::InputOrder;
use crate::grid::Grid;
use crate::level::Level;
use crate::player::Player;
use crate::theme::Theme;
use crate::tile::{DrawCommand, Tile};
use std::collections::VecDeque;
use tracing::{debug, info};

/// A queued move request: one unit step on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Left,
    Right,
    Up,
    Down,
}

impl Input {
    fn handle(self, grid: &mut Grid, player: &mut Player) {
        match self {
            Self::Left => player.move_horizontal(grid, -1),
            Self::Right => player.move_horizontal(grid, 1),
            Self::Up => player.move_vertical(grid, -1),
            Self::Down => player.move_vertical(grid, 1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    player: Player,
    inputs: VecDeque<Input>,
    input_order: InputOrder,
    tick: u64,
    /// Locks cleared during the most recent tick.
    last_cleared: Vec<(usize, usize, Tile)>,
}

impl Simulation {
    pub fn new(level: &Level, input_order: InputOrder) -> Self {
        let (x, y) = level.player_start();
        info!(
            level = level.name(),
            width = level.width(),
            height = level.height(),
            "level loaded"
        );
        Self {
            grid: Grid::from_level(level),
            player: Player::new(x, y),
            inputs: VecDeque::new(),
            input_order,
            tick: 0,
            last_cleared: Vec::new(),
        }
    }

    pub fn push_input(&mut self, input: Input) {
        self.inputs.push_back(input);
    }

    /// One tick: drain every queued input, then run the gravity sweep.
    pub fn update(&mut self) {
        self.handle_inputs();
        self.grid.update();
        self.last_cleared = self.grid.take_cleared();
        if !self.last_cleared.is_empty() {
            info!(tick = self.tick, count = self.last_cleared.len(), "locks opened");
        }
        self.tick += 1;
    }

    fn handle_inputs(&mut self) {
        while let Some(input) = self.next_input() {
            debug!(?input, tick = self.tick, "input");
            input.handle(&mut self.grid, &mut self.player);
        }
    }

    fn next_input(&mut self) -> Option<Input> {
        match self.input_order {
            InputOrder::Lifo => self.inputs.pop_back(),
            InputOrder::Fifo => self.inputs.pop_front(),
        }
    }

    /// Grid first, then the player on top.
    pub fn draw(&self, theme: &Theme) -> Vec<DrawCommand> {
        let mut commands = self.grid.draw(theme);
        commands.push(self.player.draw(theme));
        commands
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn last_cleared(&self) -> &[(usize, usize, Tile)] {
        &self.last_cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::snapshot;

    fn sim(rows: &[&str]) -> Simulation {
        let level = Level::parse("test", &rows.join("\n")).unwrap();
        Simulation::new(&level, InputOrder::Lifo)
    }

    fn run(sim: &mut Simulation, inputs: &[Input]) {
        for &input in inputs {
            sim.push_input(input);
        }
        sim.update();
    }

    fn assert_single_player_cell(sim: &Simulation) {
        let grid = sim.grid();
        assert_eq!(grid.count(|t| t == Tile::PlayerOccupancy), 1);
        let (x, y) = sim.player().position();
        assert_eq!(grid.get(x, y), Some(Tile::PlayerOccupancy));
    }

    #[test]
    fn test_player_cell_tracks_player_across_ticks() {
        let mut s = sim(&[
            "#######",
            "#P.:k.#",
            "#.#...#",
            "#######",
        ]);
        let moves = [
            Input::Right,
            Input::Right,
            Input::Right,
            Input::Down,
            Input::Left,
            Input::Up,
            Input::Left,
        ];
        for input in moves {
            run(&mut s, &[input]);
            assert_single_player_cell(&s);
        }
        assert_eq!(s.tick(), moves.len() as u64);
    }

    #[test]
    fn test_walk_into_air_and_flux() {
        let mut s = sim(&["#####", "#P:.#", "#####"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["#####", "#.P.#", "#####"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(s.player().position(), (3, 1));
    }

    #[test]
    fn test_walls_block_movement() {
        let mut s = sim(&["###", "#P#", "###"]);
        for input in [Input::Left, Input::Right, Input::Up, Input::Down] {
            run(&mut s, &[input]);
            assert_eq!(s.player().position(), (1, 1));
        }
        assert_eq!(snapshot(s.grid()), ["###", "#P#", "###"]);
    }

    #[test]
    fn test_unsupported_stone_falls_on_next_tick() {
        let mut s = sim(&["#####", "#P.o#", "#...#", "#####"]);
        run(&mut s, &[]);
        assert_eq!(snapshot(s.grid()), ["#####", "#P..#", "#..O#", "#####"]);
        run(&mut s, &[]);
        assert_eq!(snapshot(s.grid()), ["#####", "#P..#", "#..o#", "#####"]);
    }

    #[test]
    fn test_stack_cascades_within_one_tick() {
        let mut s = sim(&[
            "#####",
            "#.o.#",
            "#.o.#",
            "#.o.#",
            "#...#",
            "#P#.#",
            "#####",
        ]);
        run(&mut s, &[]);
        assert_eq!(
            snapshot(s.grid()),
            ["#####", "#...#", "#.O.#", "#.O.#", "#.O.#", "#P#.#", "#####"]
        );
        run(&mut s, &[]);
        assert_eq!(
            snapshot(s.grid()),
            ["#####", "#...#", "#.o.#", "#.o.#", "#.o.#", "#P#.#", "#####"]
        );
    }

    #[test]
    fn test_blocks_rest_on_player() {
        let mut s = sim(&["####", "#o.#", "#P.#", "####"]);
        run(&mut s, &[]);
        assert_eq!(snapshot(s.grid()), ["####", "#o.#", "#P.#", "####"]);
    }

    #[test]
    fn test_stepping_out_from_under_a_stone_lets_it_fall_same_tick() {
        let mut s = sim(&["#####", "#o..#", "#P..#", "#####"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["#####", "#...#", "#OP.#", "#####"]);
    }

    #[test]
    fn test_push_onto_unsupported_landing_fails() {
        let rows = ["######", "#Pb..#", "#.#..#", "######"];
        let mut s = sim(&rows);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), rows);
        assert_eq!(s.player().position(), (1, 1));
    }

    #[test]
    fn test_push_onto_supported_landing_moves_player_and_box() {
        let mut s = sim(&["######", "#Pb..#", "######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["######", "#.Pb.#", "######"]);
        assert_eq!(s.player().position(), (2, 1));
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["######", "#..Pb#", "######"]);
    }

    #[test]
    fn test_push_left_and_stone() {
        let mut s = sim(&["######", "#.oP.#", "######"]);
        run(&mut s, &[Input::Left]);
        assert_eq!(snapshot(s.grid()), ["######", "#oP..#", "######"]);
    }

    #[test]
    fn test_push_into_occupied_landing_fails() {
        let rows = ["######", "#Pbo.#", "######"];
        let mut s = sim(&rows);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), rows);
    }

    #[test]
    fn test_falling_block_ignores_push_until_it_rests() {
        let mut s = sim(&["######", "#PB..#", "######"]);
        // Input runs before the sweep, so the stored Falling state still applies.
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["######", "#Pb..#", "######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(snapshot(s.grid()), ["######", "#.Pb.#", "######"]);
    }

    #[test]
    fn test_push_checks_landing_support_not_current_support() {
        // The box hangs over a gap, but its landing cell sits on flux.
        let mut s = sim(&["#######", "#Pb...#", "##.:..#", "#######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(s.player().position(), (2, 1));
        assert_eq!(snapshot(s.grid())[1], "#.Pb..#");
    }

    #[test]
    fn test_cannot_enter_block_vertically() {
        let rows = ["#####", "#.P.#", "#.b.#", "#####"];
        let mut s = sim(&rows);
        run(&mut s, &[Input::Down]);
        assert_eq!(snapshot(s.grid()), rows);
    }

    #[test]
    fn test_key_clears_matching_locks_same_tick() {
        let mut s = sim(&["#######", "#Pk.K.#", "#K..J.#", "#######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(
            snapshot(s.grid()),
            ["#######", "#.P...#", "#...J.#", "#######"]
        );
        assert_eq!(s.grid().locks_remaining(), 1);
        let cleared: Vec<(usize, usize)> = s.last_cleared().iter().map(|&(x, y, _)| (x, y)).collect();
        assert_eq!(cleared, [(4, 1), (1, 2)]);
        run(&mut s, &[]);
        assert!(s.last_cleared().is_empty());
    }

    #[test]
    fn test_key_picked_up_vertically() {
        let mut s = sim(&["#####", "#P.K#", "#j.J#", "#####"]);
        run(&mut s, &[Input::Down]);
        assert_eq!(snapshot(s.grid()), ["#####", "#..K#", "#P..#", "#####"]);
    }

    #[test]
    fn test_locks_never_open_by_walking_into_them() {
        let mut s = sim(&["#######", "#PKj.k#", "#######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(s.player().position(), (1, 1));
        // Taking the other colour's key does not help either.
        let mut s = sim(&["#######", "#jPK..#", "#######"]);
        run(&mut s, &[Input::Left]);
        run(&mut s, &[Input::Right]);
        run(&mut s, &[Input::Right]);
        assert_eq!(s.player().position(), (2, 1));
        assert_eq!(snapshot(s.grid())[1], "#.PK..#");
    }

    #[test]
    fn test_opened_lock_lets_stone_fall() {
        let mut s = sim(&["######", "#Pk.o#", "####K#", "#....#", "######"]);
        run(&mut s, &[Input::Right]);
        assert_eq!(
            snapshot(s.grid()),
            ["######", "#.P..#", "####O#", "#....#", "######"]
        );
    }

    #[test]
    fn test_lifo_drains_latest_input_first() {
        let rows = ["#####", "#P..#", "#.###", "#####"];
        let mut s = sim(&rows);
        run(&mut s, &[Input::Right, Input::Down]);
        assert_eq!(s.player().position(), (1, 2));
    }

    #[test]
    fn test_fifo_drains_oldest_input_first() {
        let rows = ["#####", "#P..#", "#.###", "#####"];
        let level = Level::parse("test", &rows.join("\n")).unwrap();
        let mut s = Simulation::new(&level, InputOrder::Fifo);
        run(&mut s, &[Input::Right, Input::Down]);
        assert_eq!(s.player().position(), (2, 1));
    }

    #[test]
    fn test_later_inputs_see_earlier_moves_within_a_tick() {
        let mut s = sim(&["######", "#P...#", "######"]);
        run(&mut s, &[Input::Right, Input::Right, Input::Right]);
        assert_eq!(s.player().position(), (4, 1));
        assert_single_player_cell(&s);
    }

    #[test]
    fn test_draw_is_idempotent_and_player_last() {
        let s = sim(&["#####", "#Pbk#", "#####"]);
        let theme = Theme::default();
        let first = s.draw(&theme);
        assert_eq!(first, s.draw(&theme));
        let last = first.last().unwrap();
        assert_eq!((last.x, last.y, last.color), (1, 1, theme.player));
    }

    #[test]
    fn test_builtin_level_is_stable_without_input() {
        let level = Level::builtin().unwrap();
        let mut s = Simulation::new(&level, InputOrder::Lifo);
        let before = snapshot(s.grid());
        run(&mut s, &[]);
        assert_eq!(snapshot(s.grid()), before);
    }

    #[test]
    fn test_independent_simulations_do_not_share_state() {
        let level = Level::builtin().unwrap();
        let mut a = Simulation::new(&level, InputOrder::Lifo);
        let b = Simulation::new(&level, InputOrder::Lifo);
        run(&mut a, &[Input::Right]);
        assert_eq!(a.player().position(), (2, 1));
        assert_eq!(b.player().position(), (1, 1));
    }
}
