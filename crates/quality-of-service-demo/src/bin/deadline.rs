// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

fn main() -> anyhow::Result<()> {
    quality_of_service_demo::deadline::main()
}
