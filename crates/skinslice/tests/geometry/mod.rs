mod fixtures;

mod cube_slice;
mod limb_cut;
mod slice_partition;
