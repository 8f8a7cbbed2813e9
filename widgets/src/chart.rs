//! A small retained display list, for drawing the curve editor without a canvas.

use std::fmt::Write as _;

use emath::{Pos2, Vec2};
use image::Rgba;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Black at 20% opacity.
pub const GRID: Rgba<u8> = Rgba([0, 0, 0, 51]);

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Rgba<u8>,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Rgba<u8>,
        stroke: Option<(f32, Rgba<u8>)>,
    },
    /// Text centered on `pos`, rotated by `angle` degrees clockwise.
    Text {
        pos: Pos2,
        text: String,
        size: f32,
        angle: f32,
        color: Rgba<u8>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chart {
    pub size: Vec2,
    pub shapes: Vec<Shape>,
}

impl Chart {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn lines(&self) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (Pos2, f32)> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Circle { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" version="1.1" xmlns="http://www.w3.org/2000/svg">"#,
            w = self.size.x,
            h = self.size.y,
        );
        svg.push('\n');

        // writing to a String never fails
        for shape in &self.shapes {
            let _ = match shape {
                Shape::Line {
                    from,
                    to,
                    width,
                    color,
                } => writeln!(
                    svg,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke-width="{}" {}/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    width,
                    paint("stroke", *color),
                ),
                Shape::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    let stroke = match stroke {
                        Some((width, color)) => {
                            format!(r#"stroke-width="{}" {}"#, width, paint("stroke", *color))
                        }
                        None => String::new(),
                    };
                    writeln!(
                        svg,
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{}" {} {}/>"#,
                        center.x,
                        center.y,
                        radius,
                        paint("fill", *fill),
                        stroke,
                    )
                }
                Shape::Text {
                    pos,
                    text,
                    size,
                    angle,
                    color,
                } => writeln!(
                    svg,
                    r#"<text x="{x:.2}" y="{y:.2}" transform="rotate({angle} {x:.2} {y:.2})" font-size="{size}" font-family="Inter, sans-serif" text-anchor="middle" dominant-baseline="middle" {paint}>{text}</text>"#,
                    x = pos.x,
                    y = pos.y,
                    angle = angle,
                    size = size,
                    paint = paint("fill", *color),
                    text = escape(text),
                ),
            };
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn paint(attribute: &str, color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!(r#"{}="rgb({},{},{})""#, attribute, r, g, b)
    } else {
        format!(
            r#"{attr}="rgb({},{},{})" {attr}-opacity="{:.2}""#,
            r,
            g,
            b,
            a as f32 / 255.0,
            attr = attribute
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
