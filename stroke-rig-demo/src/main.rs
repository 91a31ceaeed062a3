use glam::{dvec2, DVec2};
use std::error::Error;
use std::fs;
use stroke_rig::{
    closed_outline,
    curve::offset::{ContourGenerator, ContourOptions, VariationDirection, WidthProfile, WidthVariation},
    deformer::weight::measure_weight,
    extract, Contour, RigConfig, Skeleton, SkinBinder, SkinDeformer,
};

fn svg_path(points: &[DVec2]) -> String {
    let contour = Contour::from_control_points(points);
    let mut path = String::new();
    if let Some(start) = contour.start() {
        path.push_str(&format!("M {:.2} {:.2}", start.x, start.y));
    }
    for curve in &contour.curves {
        path.push_str(&format!(
            " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y
        ));
    }
    path.push_str(" Z");
    path
}

fn main() -> Result<(), Box<dyn Error>> {
    // An optional JSON config path as the only argument.
    let config = match std::env::args().nth(1) {
        Some(path) => RigConfig::from_json(&fs::read_to_string(path)?)?,
        None => RigConfig::default(),
    };

    let (start, bend, end) = (dvec2(0.0, 0.0), dvec2(60.0, 40.0), dvec2(140.0, 20.0));
    let skeleton = Skeleton::new()
        .with_joint("start", start)
        .with_joint("bend", bend)
        .with_joint("end", end);

    let options = ContourOptions {
        profile: WidthProfile {
            variation: WidthVariation::Linear,
            direction: VariationDirection::Reverse,
            ..Default::default()
        },
        ..Default::default()
    };
    let sides = ContourGenerator::new(&config.contour).curve_contours(start, bend, end, 24.0, &options);
    let outline = closed_outline(&sides.out_curves, &sides.in_curves);
    let points = outline.to_control_points();

    let armature = extract(&skeleton, &config.bones);
    println!(
        "{:?} stroke: {} bones, {:.2} long",
        armature.archetype,
        armature.len(),
        armature.length()
    );
    if let Some(weight) = measure_weight(&outline, &armature.bones, &config.weight) {
        println!("weight: {:.2}", weight);
    }

    let binding = SkinBinder::new(&config.bind).bind(&points, &armature);
    println!("rest: {}", svg_path(&points));

    let mut dragged = skeleton.clone();
    dragged.insert("end", dvec2(150.0, 60.0));
    let deformed = SkinDeformer::new(&config.bones).apply(&dragged, &binding)?;
    println!("dragged: {}", svg_path(&deformed));

    println!("{}", config.to_json()?);
    Ok(())
}
