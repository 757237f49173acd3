use std::path::PathBuf;

use color_replacer::codec::{load_rgba, SaveFormat};
use color_replacer::recolor::RecolorPlan;
use color_replacer::session::{Command, Outcome, Session};
use color_replacer::types::Tolerance;
use color_replacer::viewport::Viewport;
use color_replacer::SessionError;
use image::{Rgb, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 20) as u8, (y * 20) as u8, 100, (x + y) as u8 * 10])
    })
}

fn write_png(dir: &TempDir, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

#[test]
fn png_save_then_reload_is_exact() {
    let dir = TempDir::new().unwrap();
    let input = write_png(&dir, "in.png", &gradient(6, 4));

    let mut session = Session::default();
    session.dispatch(Command::Load(input)).unwrap();
    session.dispatch(Command::PickPixel { x: 2, y: 1 }).unwrap();
    session.dispatch(Command::SetTarget(Rgb([250, 10, 10]))).unwrap();
    session
        .dispatch(Command::SetTolerance(Tolerance::new(30).unwrap()))
        .unwrap();
    session.dispatch(Command::Apply).unwrap();

    let outcome = session
        .dispatch(Command::Save {
            path: dir.path().join("out"),
            format: None,
        })
        .unwrap();
    let saved = dir.path().join("out.png");
    assert_eq!(outcome, Outcome::Saved(saved.clone()));

    let reloaded = load_rgba(&saved).unwrap();
    assert_eq!(&reloaded, session.image().unwrap());
}

#[test]
fn cancel_restores_load_time_snapshot_after_many_applies() {
    let dir = TempDir::new().unwrap();
    let original = gradient(5, 5);
    let input = write_png(&dir, "in.png", &original);

    let mut session = Session::default();
    session.dispatch(Command::Load(input)).unwrap();
    session
        .dispatch(Command::SetTolerance(Tolerance::new(100).unwrap()))
        .unwrap();

    for (x, target) in [(0, [0, 0, 255]), (3, [255, 255, 0]), (4, [9, 9, 9])] {
        session.dispatch(Command::PickPixel { x, y: x }).unwrap();
        session.dispatch(Command::SetTarget(Rgb(target))).unwrap();
        session.dispatch(Command::Apply).unwrap();
    }
    assert_ne!(session.image().unwrap(), &original);
    assert_eq!(session.original().unwrap(), &original);

    session.dispatch(Command::Cancel).unwrap();
    assert_eq!(session.image().unwrap(), &original);
}

#[test]
fn pixels_outside_tolerance_are_untouched() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let image = RgbaImage::from_fn(32, 24, |_, _| Rgba(rng.gen::<[u8; 4]>()));

    for _ in 0..8 {
        let source = Rgb(rng.gen::<[u8; 3]>());
        let target = Rgb(rng.gen::<[u8; 3]>());
        let tolerance = Tolerance::new(rng.gen_range(0..=100)).unwrap();
        let plan = RecolorPlan::new(source, target, tolerance);

        let mut output = image.clone();
        let stats = plan.apply(&mut output).unwrap();

        let mut matched = 0;
        for (before, after) in image.pixels().zip(output.pixels()) {
            if plan.matches(&before.0) {
                matched += 1;
                let expected = plan.adjusted(&before.0);
                assert_eq!(&after.0[..3], &expected[..]);
                assert_eq!(after.0[3], before.0[3]);
            } else {
                assert_eq!(after, before);
            }
        }
        assert_eq!(stats.matched, matched);
        assert_eq!(stats.total, 32 * 24);
    }
}

#[test]
fn canvas_pick_on_stretched_image() {
    let dir = TempDir::new().unwrap();
    let mut image = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
    image.put_pixel(3, 1, Rgba([40, 50, 60, 255]));
    let input = write_png(&dir, "in.png", &image);

    let mut session = Session::default();
    session.dispatch(Command::Load(input)).unwrap();
    // bottom-right quarter of the 500x500 canvas covers pixel (3, 1)
    let outcome = session.dispatch(Command::PickSource { x: 499, y: 260 }).unwrap();
    assert_eq!(outcome, Outcome::SourcePicked(Rgb([40, 50, 60])));
}

#[test]
fn jpeg_save_drops_alpha() {
    let dir = TempDir::new().unwrap();
    let session = Session::default().with_image("mem.png", gradient(8, 8));
    let (_, result) = session.handle(Command::Save {
        path: dir.path().join("out.jpg"),
        format: None,
    });
    let saved = match result.unwrap() {
        Outcome::Saved(path) => path,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(load_rgba(&saved).unwrap().dimensions(), (8, 8));
}

#[test]
fn preview_is_canvas_sized() {
    let dir = TempDir::new().unwrap();
    let viewport = Viewport {
        width: 50,
        height: 30,
        ..Viewport::default()
    };
    let mut session = Session::new(viewport, SaveFormat::Png).with_image("mem.png", gradient(7, 3));
    let outcome = session
        .dispatch(Command::Preview(dir.path().join("shown")))
        .unwrap();
    assert_eq!(outcome, Outcome::PreviewWritten(dir.path().join("shown.png")));
    assert_eq!(
        load_rgba(&dir.path().join("shown.png")).unwrap().dimensions(),
        (50, 30)
    );
}

#[test]
fn unreadable_file_leaves_session_alone() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("not-an-image.png");
    std::fs::write(&bogus, b"definitely not a png").unwrap();

    let session = Session::default().with_image("mem.png", gradient(3, 3));
    let (session, result) = session.handle(Command::Load(bogus));
    assert!(matches!(result, Err(SessionError::Load(_))));
    assert_eq!(session.image().unwrap(), &gradient(3, 3));

    let (_, result) = session.handle(Command::Save {
        path: dir.path().join("out.xcf"),
        format: None,
    });
    assert!(matches!(result, Err(SessionError::UnsupportedFormat(_))));
    assert!(!dir.path().join("out.xcf").exists());
}
