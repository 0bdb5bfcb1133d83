//! Collision detection and response
//!
//! Walls reflect, paddles redirect by contact offset, and field edges decide
//! who lost the ball.

use glam::Vec2;

use super::state::{Ball, Paddle, Side};
use crate::consts::MAX_BOUNCE_ANGLE;
use crate::velocity_from_angle;

/// Result of a ball/paddle contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleContact {
    /// Contact point relative to paddle center, -1 (top) to 1 (bottom)
    pub offset: f32,
    /// Scalar speed after the hit
    pub speed: f32,
}

/// Circle-circle proximity (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

/// Bounce off the top or bottom wall. Returns true on contact.
pub fn ball_wall_collision(ball: &mut Ball, field_height: f32) -> bool {
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        true
    } else if ball.pos.y + ball.radius > field_height {
        ball.pos.y = field_height - ball.radius;
        ball.vel.y = -ball.vel.y.abs();
        true
    } else {
        false
    }
}

/// Bounce angle for a normalized contact offset.
/// Hits above center (negative offset) send the ball up the screen.
#[inline]
pub fn bounce_angle(offset: f32) -> f32 {
    offset.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE
}

/// Check and resolve a ball hitting `paddle`.
///
/// `prev_x` is the ball's x before this frame's integration, so a ball that
/// moved further than the paddle's thickness in one frame is still caught
/// as long as it started in front of the paddle.
pub fn ball_paddle_collision(
    ball: &mut Ball,
    prev_x: f32,
    paddle: &Paddle,
    effective_height: f32,
    speed_increment: f32,
    max_speed: Option<f32>,
) -> Option<PaddleContact> {
    let dir = paddle.away_dir();
    // Only balls heading into the paddle
    if ball.vel.x * dir >= 0.0 {
        return None;
    }

    let face = paddle.face_x();
    let depth_now = (face - (ball.pos.x - dir * ball.radius)) * dir;
    let depth_prev = (face - (prev_x - dir * ball.radius)) * dir;
    if depth_now < 0.0 || depth_prev > paddle.width {
        return None;
    }

    let half = effective_height / 2.0;
    if half <= 0.0 {
        return None;
    }
    let rel = ball.pos.y - paddle.y;
    if rel.abs() > half {
        return None;
    }

    let offset = (rel / half).clamp(-1.0, 1.0);
    let current = ball.speed();
    let mut speed = current + speed_increment;
    if let Some(cap) = max_speed {
        speed = speed.min(cap.max(current));
    }

    ball.vel = velocity_from_angle(speed, bounce_angle(offset), dir);
    ball.pos.x = face + dir * ball.radius;

    Some(PaddleContact { offset, speed })
}

/// Side that lost the ball, if its leading edge has left the field
pub fn ball_exit_side(ball: &Ball, field_width: f32) -> Option<Side> {
    if ball.pos.x - ball.radius <= 0.0 {
        Some(Side::Player)
    } else if ball.pos.x + ball.radius >= field_width {
        Some(Side::Computer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        Ball::new(1, Vec2::new(x, y), Vec2::new(vx, vy), true)
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.1, 0.0), 5.0));
    }

    #[test]
    fn test_wall_collision_top_and_bottom() {
        let mut ball = ball_at(100.0, 5.0, 100.0, -50.0);
        assert!(ball_wall_collision(&mut ball, FIELD_HEIGHT));
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.pos.y, BALL_RADIUS);

        let mut ball = ball_at(100.0, FIELD_HEIGHT - 2.0, 100.0, 50.0);
        assert!(ball_wall_collision(&mut ball, FIELD_HEIGHT));
        assert!(ball.vel.y < 0.0);

        let mut ball = ball_at(100.0, 200.0, 100.0, 50.0);
        assert!(!ball_wall_collision(&mut ball, FIELD_HEIGHT));
    }

    #[test]
    fn test_player_paddle_hit_reverses_and_speeds_up() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face + BALL_RADIUS - 2.0, paddle.y, -300.0, 0.0);
        let contact = ball_paddle_collision(
            &mut ball,
            face + BALL_RADIUS + 3.0,
            &paddle,
            PADDLE_HEIGHT,
            BALL_SPEED_INCREMENT,
            None,
        )
        .expect("should hit");
        assert!(ball.vel.x > 0.0);
        assert!((contact.speed - (300.0 + BALL_SPEED_INCREMENT)).abs() < 1e-3);
        assert_eq!(ball.pos.x, face + BALL_RADIUS);
    }

    #[test]
    fn test_hit_above_center_goes_up() {
        let paddle = Paddle::new(Side::Computer, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face - BALL_RADIUS + 1.0, paddle.y - 40.0, 300.0, 0.0);
        let contact =
            ball_paddle_collision(&mut ball, face - BALL_RADIUS - 4.0, &paddle, PADDLE_HEIGHT, 0.0, None)
                .expect("should hit");
        assert!(contact.offset < 0.0);
        assert!(ball.vel.y < 0.0);
        assert!(ball.vel.x < 0.0);
    }

    #[test]
    fn test_edge_hit_uses_max_angle() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face + BALL_RADIUS - 1.0, paddle.y + PADDLE_HEIGHT / 2.0, -300.0, 0.0);
        ball_paddle_collision(&mut ball, face + BALL_RADIUS + 1.0, &paddle, PADDLE_HEIGHT, 0.0, None)
            .expect("should hit");
        let angle = ball.vel.y.atan2(ball.vel.x);
        assert!((angle - MAX_BOUNCE_ANGLE).abs() < 1e-4);
    }

    #[test]
    fn test_miss_outside_effective_height() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face + BALL_RADIUS - 1.0, paddle.y + 60.0, -300.0, 0.0);
        assert!(
            ball_paddle_collision(&mut ball, face + BALL_RADIUS + 1.0, &paddle, PADDLE_HEIGHT, 0.0, None)
                .is_none()
        );
        // The same contact hits once the paddle is enlarged
        assert!(
            ball_paddle_collision(&mut ball, face + BALL_RADIUS + 1.0, &paddle, PADDLE_HEIGHT * 1.5, 0.0, None)
                .is_some()
        );
    }

    #[test]
    fn test_ball_moving_away_is_ignored() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face + BALL_RADIUS - 1.0, paddle.y, 300.0, 0.0);
        assert!(ball_paddle_collision(&mut ball, face, &paddle, PADDLE_HEIGHT, 0.0, None).is_none());
    }

    #[test]
    fn test_ball_already_behind_paddle_is_ignored() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let mut ball = ball_at(paddle.x - 5.0, paddle.y, -300.0, 0.0);
        assert!(ball_paddle_collision(&mut ball, paddle.x - 1.0, &paddle, PADDLE_HEIGHT, 0.0, None).is_none());
    }

    #[test]
    fn test_speed_cap_never_slows_ball() {
        let paddle = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let face = paddle.face_x();
        let mut ball = ball_at(face + BALL_RADIUS - 1.0, paddle.y, -500.0, 0.0);
        let contact = ball_paddle_collision(
            &mut ball,
            face + BALL_RADIUS + 1.0,
            &paddle,
            PADDLE_HEIGHT,
            BALL_SPEED_INCREMENT,
            Some(400.0),
        )
        .expect("should hit");
        assert!((contact.speed - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_exit_side() {
        assert_eq!(ball_exit_side(&ball_at(5.0, 100.0, -1.0, 0.0), FIELD_WIDTH), Some(Side::Player));
        assert_eq!(
            ball_exit_side(&ball_at(FIELD_WIDTH - 5.0, 100.0, 1.0, 0.0), FIELD_WIDTH),
            Some(Side::Computer)
        );
        assert_eq!(ball_exit_side(&ball_at(400.0, 100.0, 1.0, 0.0), FIELD_WIDTH), None);
    }
}
