//! Complete workflow demonstration for castle_layout

use castle_layout::*;

fn main() -> Result<()> {
    println!("=== castle_layout Complete Demo ===\n");

    // Step 1: Configure layout
    println!("Step 1: Configuring layout...");
    let config = LayoutConfigBuilder::new()
        .seed(12345)
        .catalog(RoomCatalog::keep())
        .region(160.0, 160.0)?
        .sample_radius(4.0)?
        .spawn_point_radius(10.0)?
        .max_layout_retries(20)
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Region: {} x {}", config.region_width, config.region_height);
    println!("  Towers: {}", config.catalog.towers().len());
    println!("  Interior rooms: {}", config.catalog.interior_room_count());

    // Step 2: Generate layout
    println!("\nStep 2: Generating layout...");
    let layout = generate_layout(&config)?;
    println!(
        "  Accepted after {} attempt(s): {} mesh triangles, {} rooms",
        layout.attempts,
        layout.mesh.len(),
        layout.rooms.len()
    );

    // Step 3: Rooms
    println!("\nStep 3: Rooms:");
    for room in layout.catalog_rooms() {
        println!(
            "  #{:<3} {:12} {:3}/{:3} triangles, {} border edges",
            room.id,
            room.kind.name(),
            room.triangle_count(),
            room.target_size,
            room.border_edges.len()
        );
    }
    println!("  Hallway cells: {}", layout.hallways().count());
    if let Some(wall) = &layout.wall {
        println!("  Wall perimeter: {:.1}", wall.perimeter());
    }

    // Step 4: Connectivity
    println!("\nStep 4: Connectivity:");
    println!("  Spanning tree edges: {}", layout.mst_edges.len());
    println!("  Doors: {}", layout.doors.len());
    for corridor in &layout.corridors {
        println!(
            "  {} -> {}: {} cells, cost {:.0}{}",
            layout.room(corridor.from).kind.name(),
            layout.room(corridor.to).kind.name(),
            corridor.nodes.len(),
            corridor.cost,
            if corridor.partial { " (partial)" } else { "" }
        );
    }
    for warning in &layout.warnings {
        println!("  Warning: {}", warning);
    }

    // Step 5: Spring relaxation of room bounds
    println!("\nStep 5: Relaxing room bounds...");
    let mut relaxer = LayoutRelaxer::new(layout.room_bounds(), RelaxOptions::default());
    relaxer.run(200);
    let overlaps = |boxes: &[generation::BoundBox]| {
        let mut count = 0;
        for (i, a) in boxes.iter().enumerate() {
            count += boxes[i + 1..].iter().filter(|b| a.overlaps(b)).count();
        }
        count
    };
    println!("  Overlapping pairs before: {}", overlaps(&layout.room_bounds()));
    println!("  Overlapping pairs after:  {}", overlaps(&relaxer.boxes()));

    // Step 6: Generate mesh
    println!("\nStep 6: Generating mesh...");
    let mesh = generate_mesh(&layout, &BasicColorMapper);
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Markers: {}", mesh.markers.len());
    println!("  Lines: {}", mesh.lines.len());

    let custom = CustomColorMapper::default().with_room(RoomKind::Chapel, [0.0, 0.2, 0.5, 1.0]);
    let _mesh2 = generate_mesh(&layout, &custom);
    println!("  Custom color mapper works!");

    // Memory estimate
    let mem = (mesh.positions.len() * 12 + mesh.normals.len() * 12 +
               mesh.colors.len() * 16 + mesh.indices.len() * 4) as f32 / 1024.0;
    println!("  Memory: {:.1} KB", mem);

    println!("\n=== Demo Complete ===");
    Ok(())
}
