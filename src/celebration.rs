use rand::seq::SliceRandom;
use rand::Rng;

const CONFETTI_PIECES: usize = 60;
const DURATION_SECS: f64 = 3.0;
const GRAVITY: f64 = 6.0;

const CHEERS: [&str; 5] = ["LEVEL CLEAR!", "WELL DONE!", "AMAZING!", "SUPERB!", "BRILLIANT!"];

/// One confetti piece falling across the board
#[derive(Debug, Clone)]
pub struct Confetti {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
}

impl Confetti {
    fn spawn<R: Rng + ?Sized>(width: f64, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: rng.gen_range(-6.0..0.0),
            vel_x: rng.gen_range(-1.5..1.5),
            vel_y: rng.gen_range(1.0..4.0),
            symbol: *['*', '+', '✦', '•', '❖', '✿'].choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
        }
    }

    fn update(&mut self, dt: f64) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
    }
}

/// Confetti shower shown when a memory level is cleared
#[derive(Debug)]
pub struct Celebration {
    pub pieces: Vec<Confetti>,
    pub banner: &'static str,
    pub is_active: bool,
    elapsed: f64,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            banner: CHEERS[0],
            is_active: false,
            elapsed: 0.0,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.width = width as f64;
        self.height = height as f64;
        self.elapsed = 0.0;
        self.is_active = true;
        self.banner = CHEERS.choose(&mut rng).copied().unwrap_or(CHEERS[0]);
        self.pieces = (0..CONFETTI_PIECES)
            .map(|_| Confetti::spawn(self.width, &mut rng))
            .collect();
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.pieces.clear();
    }

    /// Advance the animation; pieces that leave the screen are dropped
    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= DURATION_SECS {
            self.stop();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.pieces.retain_mut(|piece| {
            piece.update(dt);
            piece.y <= height && piece.x >= -1.0 && piece.x <= width + 1.0
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive() {
        let celebration = Celebration::new();
        assert!(!celebration.is_active);
        assert!(celebration.pieces.is_empty());
    }

    #[test]
    fn start_spawns_confetti_and_banner() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24);
        assert!(celebration.is_active);
        assert_eq!(celebration.pieces.len(), CONFETTI_PIECES);
        assert!(CHEERS.contains(&celebration.banner));
    }

    #[test]
    fn confetti_falls() {
        let mut piece = Confetti {
            x: 5.0,
            y: 0.0,
            vel_x: 0.0,
            vel_y: 1.0,
            symbol: '*',
            color_index: 0,
        };
        piece.update(0.5);
        assert_eq!(piece.y, 0.5);
        assert!(piece.vel_y > 1.0);
    }

    #[test]
    fn off_screen_pieces_are_removed() {
        let mut celebration = Celebration::new();
        celebration.start(20, 10);
        celebration.pieces.push(Confetti {
            x: 200.0,
            y: 5.0,
            vel_x: 0.0,
            vel_y: 0.0,
            symbol: '*',
            color_index: 0,
        });
        celebration.update(0.1);
        assert!(celebration.pieces.iter().all(|p| p.x <= 21.0));
    }

    #[test]
    fn ends_after_duration() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24);
        for _ in 0..29 {
            celebration.update(0.1);
        }
        assert!(celebration.is_active);
        celebration.update(0.2);
        assert!(!celebration.is_active);
        assert!(celebration.pieces.is_empty());
    }
}
