use std::f64::consts::TAU;

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke};
use gpuviz_core::camera::{CameraRig, PerspectiveCamera};
use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use crate::theme::scene_color;

const CYLINDER_SEGMENTS: usize = 16;
const TORUS_SEGMENTS: usize = 32;
const MIN_TEXT_PX: f32 = 5.0;
const MAX_TEXT_PX: f32 = 42.0;

/// Affine transform: `origin + basis · p`. Columns of `basis` carry the
/// accumulated rotation and uniform scale.
#[derive(Debug, Clone, Copy)]
struct Transform {
    origin: Vec3,
    basis: [Vec3; 3],
}

impl Transform {
    fn identity() -> Self {
        Self {
            origin: Vec3::ZERO,
            basis: [
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::Y,
                Vec3::new(0.0, 0.0, 1.0),
            ],
        }
    }

    fn apply_dir(&self, v: Vec3) -> Vec3 {
        self.basis[0] * v.x + self.basis[1] * v.y + self.basis[2] * v.z
    }

    fn apply(&self, p: Vec3) -> Vec3 {
        self.origin + self.apply_dir(p)
    }

    /// `self · translate(t) · rotate(r) · scale(s)`
    fn then(&self, translate: Vec3, rotation: Vec3, scale: f64) -> Self {
        let axis = |v: Vec3| self.apply_dir(v.rotate_euler(rotation) * scale);
        Self {
            origin: self.apply(translate),
            basis: [
                axis(Vec3::new(1.0, 0.0, 0.0)),
                axis(Vec3::Y),
                axis(Vec3::new(0.0, 0.0, 1.0)),
            ],
        }
    }

    /// Mean axis length, used to scale sizes that are not geometry
    /// (text, line widths).
    fn scale(&self) -> f64 {
        (self.basis[0].length() + self.basis[1].length() + self.basis[2].length()) / 3.0
    }
}

/// Perspective projection of world points onto the viewport.
struct Projector {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    /// Pixels per unit at distance 1.
    focal: f64,
    center: Pos2,
    near: f64,
}

impl Projector {
    fn new(camera: &PerspectiveCamera, rect: Rect) -> Self {
        let (right, up, forward) = camera.basis();
        let half_fov = camera.fov_deg.to_radians() / 2.0;
        Self {
            eye: camera.position(),
            right,
            up,
            forward,
            focal: f64::from(rect.height()) / 2.0 / half_fov.tan(),
            center: rect.center(),
            near: camera.near,
        }
    }

    fn to_camera(&self, p: Vec3) -> Vec3 {
        let d = p - self.eye;
        Vec3::new(d.dot(self.right), d.dot(self.up), d.dot(self.forward))
    }

    /// Camera-space point to screen; `None` behind the eye. Callers clip
    /// against the near plane first.
    fn project(&self, c: Vec3) -> Option<Pos2> {
        if c.z <= f64::EPSILON {
            return None;
        }
        Some(Pos2::new(
            self.center.x + (c.x / c.z * self.focal) as f32,
            self.center.y - (c.y / c.z * self.focal) as f32,
        ))
    }

    /// Clip a camera-space polygon against the near plane.
    fn clip_polygon(&self, points: &[Vec3]) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(points.len() + 2);
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            let (a_in, b_in) = (a.z >= self.near, b.z >= self.near);
            if a_in {
                out.push(a);
            }
            if a_in != b_in {
                out.push(self.near_crossing(a, b));
            }
        }
        out
    }

    fn clip_segment(&self, a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
        match (a.z >= self.near, b.z >= self.near) {
            (true, true) => Some((a, b)),
            (true, false) => Some((a, self.near_crossing(a, b))),
            (false, true) => Some((self.near_crossing(a, b), b)),
            (false, false) => None,
        }
    }

    fn near_crossing(&self, a: Vec3, b: Vec3) -> Vec3 {
        let t = (self.near - a.z) / (b.z - a.z);
        Vec3::lerp(a, b, t)
    }

    fn pixels(&self, size: f64, depth: f64) -> f32 {
        (size * self.focal / depth.max(self.near)) as f32
    }
}

/// Light rig collected from the command list.
#[derive(Debug, Clone, Copy)]
struct Lighting {
    ambient: f64,
    /// Unit vectors toward each directional light, with intensity.
    directional: [(Vec3, f64); 4],
    count: usize,
}

impl Lighting {
    fn collect(commands: &[SceneCommand]) -> Self {
        let mut lighting = Self {
            ambient: 0.0,
            directional: [(Vec3::Y, 0.0); 4],
            count: 0,
        };
        for cmd in commands {
            match cmd {
                SceneCommand::AmbientLight { intensity } => {
                    lighting.ambient += f64::from(*intensity);
                }
                SceneCommand::DirectionalLight {
                    position,
                    intensity,
                    ..
                } => {
                    if let (Some(dir), Some(slot)) = (
                        position.try_normalize(),
                        lighting.directional.get_mut(lighting.count),
                    ) {
                        *slot = (dir, f64::from(*intensity));
                        lighting.count += 1;
                    }
                }
                _ => {}
            }
        }
        if lighting.ambient == 0.0 && lighting.count == 0 {
            lighting.ambient = 1.0;
        }
        lighting
    }

    /// Brightness in `[0, 1]` for a world-space unit normal. A face turned
    /// straight at the strongest light reads as full brightness.
    fn brightness(&self, normal: Vec3) -> f64 {
        let lights = &self.directional[..self.count];
        let diffuse: f64 = lights
            .iter()
            .map(|(dir, intensity)| intensity * normal.dot(*dir).max(0.0))
            .sum();
        let peak = self.ambient + lights.iter().map(|(_, i)| *i).fold(0.0, f64::max);
        if peak <= 0.0 {
            return 1.0;
        }
        ((self.ambient + diffuse) / peak).clamp(0.0, 1.0)
    }

    fn shade(&self, material: &Material, normal: Vec3) -> Color32 {
        let light = self.brightness(normal) as f32;
        let glow = material
            .emissive
            .map_or(Color::BLACK, |e| scale(e, material.emissive_intensity));
        let lit = Color::rgba(
            material.color.r * light + glow.r,
            material.color.g * light + glow.g,
            material.color.b * light + glow.b,
            material.opacity,
        );
        scene_color(lit)
    }
}

fn scale(c: Color, k: f32) -> Color {
    Color::rgba(c.r * k, c.g * k, c.b * k, c.a)
}

#[derive(Debug, Clone)]
enum Primitive {
    Polygon(Vec<Pos2>, Color32),
    Polyline(Vec<Pos2>, Stroke),
    Circle(Pos2, f32, Color32),
    Text(Pos2, String, f32, Color32),
}

/// A primitive waiting for the painter's sort.
struct Item {
    depth: f64,
    primitive: Primitive,
}

/// Screen area covered by one labelled group, for hover tooltips.
#[derive(Debug, Clone)]
pub struct HitRegion {
    pub rect: Rect,
    pub group_id: String,
    pub label: String,
}

/// Result of rendering a command list: includes hit regions for interaction.
pub struct RenderResult {
    pub hit_regions: Vec<HitRegion>,
    pub primitives: usize,
}

impl RenderResult {
    /// Innermost group under `pos` (nested groups have smaller rects).
    pub fn hit(&self, pos: Pos2) -> Option<&HitRegion> {
        self.hit_regions
            .iter()
            .filter(|r| r.rect.contains(pos))
            .min_by(|a, b| a.rect.area().total_cmp(&b.rect.area()))
    }
}

struct Rasterizer<'a> {
    projector: &'a Projector,
    lighting: Lighting,
    items: Vec<Item>,
    regions: Vec<HitRegion>,
    /// Indices into `regions` for the open groups.
    open: Vec<usize>,
}

impl Rasterizer<'_> {
    fn mark(&mut self, points: impl IntoIterator<Item = Pos2>) {
        if let Some(region) = self.open.last().and_then(|&i| self.regions.get_mut(i)) {
            for p in points {
                region.rect.extend_with(p);
            }
        }
    }

    fn begin_group(&mut self, id: &str, label: Option<&str>) {
        self.regions.push(HitRegion {
            rect: Rect::NOTHING,
            group_id: id.to_string(),
            label: label.unwrap_or(id).to_string(),
        });
        self.open.push(self.regions.len() - 1);
    }

    fn end_group(&mut self) {
        let Some(index) = self.open.pop() else {
            return;
        };
        let Some(child) = self.regions.get(index).map(|r| r.rect) else {
            return;
        };
        if !child.is_positive() {
            return;
        }
        if let Some(parent) = self.open.last().and_then(|&i| self.regions.get_mut(i)) {
            parent.rect = parent.rect.union(child);
        }
    }

    /// Draw a flat face. `normal` is the world-space outward normal; with
    /// `cull` set, faces turned away from the eye are skipped, otherwise the
    /// normal is flipped toward the eye for lighting.
    fn face(
        &mut self,
        world: &[Vec3],
        normal: Vec3,
        material: &Material,
        cull: bool,
        far_sort: bool,
    ) {
        let Some(first) = world.first() else {
            return;
        };
        let Some(mut normal) = normal.try_normalize() else {
            return;
        };
        if normal.dot(*first - self.projector.eye) > 0.0 {
            if cull {
                return;
            }
            normal = -normal;
        }
        let camera: Vec<Vec3> = world.iter().map(|p| self.projector.to_camera(*p)).collect();
        let clipped = self.projector.clip_polygon(&camera);
        if clipped.len() < 3 {
            return;
        }
        let depth = if far_sort {
            clipped.iter().map(|c| c.z).fold(f64::MIN, f64::max)
        } else {
            clipped.iter().map(|c| c.z).sum::<f64>() / clipped.len() as f64
        };
        let screen: Vec<Pos2> = clipped
            .iter()
            .filter_map(|c| self.projector.project(*c))
            .collect();
        self.mark(screen.iter().copied());
        let fill = self.lighting.shade(material, normal);
        self.items.push(Item {
            depth,
            primitive: Primitive::Polygon(screen, fill),
        });
    }

    fn segment(&mut self, a: Vec3, b: Vec3, stroke: Stroke) {
        let (ca, cb) = (self.projector.to_camera(a), self.projector.to_camera(b));
        let Some((ca, cb)) = self.projector.clip_segment(ca, cb) else {
            return;
        };
        let (Some(pa), Some(pb)) = (self.projector.project(ca), self.projector.project(cb)) else {
            return;
        };
        self.items.push(Item {
            depth: (ca.z + cb.z) / 2.0,
            primitive: Primitive::Polyline(vec![pa, pb], stroke),
        });
    }

    fn draw_box(&mut self, tf: &Transform, center: Vec3, size: Vec3, material: &Material) {
        let half = [size.x / 2.0, size.y / 2.0, size.z / 2.0];
        for axis in 0..3 {
            let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);
            for sign in [-1.0, 1.0] {
                let corner = |u: f64, v: f64| {
                    let mut p = [0.0; 3];
                    p[axis] = sign * half[axis];
                    p[a] = u * half[a];
                    p[b] = v * half[b];
                    tf.apply(center + Vec3::from(p))
                };
                let quad = [
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                ];
                let mut n = [0.0; 3];
                n[axis] = sign;
                let normal = tf.apply_dir(Vec3::from(n));
                self.face(&quad, normal, material, material.opacity >= 1.0, false);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cylinder(
        &mut self,
        tf: &Transform,
        center: Vec3,
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        spin: f64,
        material: &Material,
    ) {
        let half = height / 2.0;
        let ring = |radius: f64, y: f64| -> Vec<Vec3> {
            (0..CYLINDER_SEGMENTS)
                .map(|i| {
                    let angle = spin + i as f64 / CYLINDER_SEGMENTS as f64 * TAU;
                    tf.apply(center + Vec3::new(radius * angle.cos(), y, radius * angle.sin()))
                })
                .collect()
        };
        let top = ring(radius_top, half);
        let bottom = ring(radius_bottom, -half);
        let slope = (radius_bottom - radius_top) / height.max(1e-9);
        let cull = material.opacity >= 1.0;

        for i in 0..CYLINDER_SEGMENTS {
            let j = (i + 1) % CYLINDER_SEGMENTS;
            let mid = (i as f64 + 0.5) / CYLINDER_SEGMENTS as f64 * TAU + spin;
            let normal = tf.apply_dir(Vec3::new(mid.cos(), slope, mid.sin()));
            self.face(&[bottom[i], bottom[j], top[j], top[i]], normal, material, cull, false);
        }
        self.face(&top, tf.apply_dir(Vec3::Y), material, cull, false);
        self.face(&bottom, tf.apply_dir(-Vec3::Y), material, cull, false);

        // A single radial blade mark makes rotation visible on round parts.
        if spin != 0.0 {
            let tip = tf.apply(center + Vec3::new(radius_top * spin.cos(), half, radius_top * spin.sin()));
            let hub = tf.apply(center + Vec3::new(0.0, half, 0.0));
            let mark = scale(material.color, 0.4);
            self.segment(hub, tip, Stroke::new(1.5, scene_color(mark)));
        }
    }

    fn draw_sphere(&mut self, tf: &Transform, center: Vec3, radius: f64, material: &Material) {
        let c = self.projector.to_camera(tf.apply(center));
        let Some(pos) = self.projector.project(c) else {
            return;
        };
        let r = self.projector.pixels(radius * tf.scale(), c.z).max(0.5);
        let toward_eye = (self.projector.eye - tf.apply(center))
            .try_normalize()
            .unwrap_or(Vec3::Y);
        self.mark([pos - egui::vec2(r, r), pos + egui::vec2(r, r)]);
        self.items.push(Item {
            depth: c.z,
            primitive: Primitive::Circle(pos, r, self.lighting.shade(material, toward_eye)),
        });
    }

    fn draw_torus(
        &mut self,
        tf: &Transform,
        center: Vec3,
        radius: f64,
        tube: f64,
        material: &Material,
    ) {
        let camera: Vec<Vec3> = (0..=TORUS_SEGMENTS)
            .map(|i| {
                let angle = i as f64 / TORUS_SEGMENTS as f64 * TAU;
                let p = center + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
                self.projector.to_camera(tf.apply(p))
            })
            .collect();
        if camera.iter().any(|c| c.z < self.projector.near) {
            return;
        }
        let depth = camera.iter().map(|c| c.z).sum::<f64>() / camera.len() as f64;
        let points: Vec<Pos2> = camera.iter().filter_map(|c| self.projector.project(*c)).collect();
        let width = self.projector.pixels(tube * 2.0 * tf.scale(), depth).max(1.0);
        self.mark(points.iter().copied());
        let color = self.lighting.shade(material, tf.apply_dir(Vec3::Y));
        self.items.push(Item {
            depth,
            primitive: Primitive::Polyline(points, Stroke::new(width, color)),
        });
    }

    fn draw_plane(
        &mut self,
        tf: &Transform,
        center: Vec3,
        width: f64,
        depth: f64,
        material: &Material,
    ) {
        let (hw, hd) = (width / 2.0, depth / 2.0);
        let quad = [
            tf.apply(center + Vec3::new(-hw, 0.0, -hd)),
            tf.apply(center + Vec3::new(hw, 0.0, -hd)),
            tf.apply(center + Vec3::new(hw, 0.0, hd)),
            tf.apply(center + Vec3::new(-hw, 0.0, hd)),
        ];
        // Planes sort by their farthest point so floors stay under the
        // objects standing on them.
        self.face(&quad, tf.apply_dir(Vec3::Y), material, false, true);
    }

    fn draw_grid(
        &mut self,
        tf: &Transform,
        center: Vec3,
        size: f64,
        divisions: u32,
        center_color: Color,
        line_color: Color,
    ) {
        if divisions == 0 {
            return;
        }
        let half = size / 2.0;
        let step = size / f64::from(divisions);
        for i in 0..=divisions {
            let offset = -half + f64::from(i) * step;
            let color = if 2 * i == divisions { center_color } else { line_color };
            let stroke = Stroke::new(1.0, scene_color(color));
            self.segment(
                tf.apply(center + Vec3::new(offset, 0.0, -half)),
                tf.apply(center + Vec3::new(offset, 0.0, half)),
                stroke,
            );
            self.segment(
                tf.apply(center + Vec3::new(-half, 0.0, offset)),
                tf.apply(center + Vec3::new(half, 0.0, offset)),
                stroke,
            );
        }
    }

    fn draw_text(
        &mut self,
        tf: &Transform,
        position: Vec3,
        text: &str,
        color: Color,
        font_size: f64,
    ) {
        let c = self.projector.to_camera(tf.apply(position));
        let Some(pos) = self.projector.project(c) else {
            return;
        };
        let px = self.projector.pixels(font_size * tf.scale(), c.z);
        if px < MIN_TEXT_PX {
            return;
        }
        self.items.push(Item {
            // Labels float in front of the geometry they annotate.
            depth: c.z * 0.98,
            primitive: Primitive::Text(pos, text.to_string(), px.min(MAX_TEXT_PX), scene_color(color)),
        });
    }
}

/// Render a list of `SceneCommand` into an egui `Painter` through `camera`.
///
/// Primitives are depth-sorted far to near before painting. Returns hit
/// regions for every labelled group.
pub fn render_scene(
    painter: &egui::Painter,
    rect: Rect,
    camera: &PerspectiveCamera,
    commands: &[SceneCommand],
) -> RenderResult {
    let projector = Projector::new(camera, rect);
    let mut r = Rasterizer {
        projector: &projector,
        lighting: Lighting::collect(commands),
        items: Vec::with_capacity(commands.len() * 6),
        regions: Vec::new(),
        open: Vec::new(),
    };
    let mut transform_stack: Vec<Transform> = vec![Transform::identity()];

    for cmd in commands {
        let tf = transform_stack
            .last()
            .copied()
            .unwrap_or(Transform::identity());
        match cmd {
            SceneCommand::DrawBox {
                center,
                size,
                material,
            } => r.draw_box(&tf, *center, *size, material),
            SceneCommand::DrawCylinder {
                center,
                radius_top,
                radius_bottom,
                height,
                spin,
                material,
            } => r.draw_cylinder(&tf, *center, *radius_top, *radius_bottom, *height, *spin, material),
            SceneCommand::DrawSphere {
                center,
                radius,
                material,
            } => r.draw_sphere(&tf, *center, *radius, material),
            SceneCommand::DrawTorus {
                center,
                radius,
                tube,
                material,
            } => r.draw_torus(&tf, *center, *radius, *tube, material),
            SceneCommand::DrawPlane {
                center,
                width,
                depth,
                material,
            } => r.draw_plane(&tf, *center, *width, *depth, material),
            SceneCommand::DrawGrid {
                center,
                size,
                divisions,
                center_color,
                line_color,
            } => r.draw_grid(&tf, *center, *size, *divisions, *center_color, *line_color),
            SceneCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => r.segment(
                tf.apply(*from),
                tf.apply(*to),
                Stroke::new(*width as f32, scene_color(*color)),
            ),
            SceneCommand::DrawText {
                position,
                text,
                color,
                font_size,
            } => r.draw_text(&tf, *position, text, *color, *font_size),
            SceneCommand::PushTransform {
                translate,
                rotation,
                scale,
            } => transform_stack.push(tf.then(*translate, *rotation, *scale)),
            SceneCommand::PopTransform => {
                if transform_stack.len() > 1 {
                    transform_stack.pop();
                }
            }
            SceneCommand::BeginGroup { id, label } => r.begin_group(id, label.as_deref()),
            SceneCommand::EndGroup => r.end_group(),
            SceneCommand::AmbientLight { .. } | SceneCommand::DirectionalLight { .. } => {}
        }
    }

    let mut items = r.items;
    items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let primitives = items.len();

    for item in items {
        match item.primitive {
            Primitive::Polygon(points, fill) => {
                painter.add(egui::Shape::convex_polygon(points, fill, Stroke::NONE));
            }
            Primitive::Polyline(points, stroke) => {
                painter.add(egui::Shape::line(points, stroke));
            }
            Primitive::Circle(center, radius, fill) => {
                painter.circle_filled(center, radius, fill);
            }
            Primitive::Text(pos, text, px, color) => {
                painter.text(pos, Align2::CENTER_CENTER, text, FontId::proportional(px), color);
            }
        }
    }

    let hit_regions = r
        .regions
        .into_iter()
        .filter(|region| region.rect.is_positive() && region.rect.intersects(rect))
        .collect();
    RenderResult {
        hit_regions,
        primitives,
    }
}
